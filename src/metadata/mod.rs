//! Typed metadata document model
//!
//! Mirrors the `fmu_results` schema: serialized names, optional blocks and
//! closed vocabularies match the published document layout.

mod data;
mod document;
mod enums;
mod fields;

pub use data::{
    BoundingBox, CpGridSpec, Data, FieldOutline, FieldRegion, FluidContact, Layer,
    PolygonsSpec, Seismic, Specification, SurfaceSpec, TableSpec, Time, Timestamp,
};
pub use document::{read_value, sidecar_path, MetaFormat, MetadataDocument};
pub use enums::{
    Classification, Content, ContextStage, DomainReference, FileFormat, FluidContactType,
    Layout, MetadataClass, SimulationMode, StandardResultName, TracklogEventType,
    VerticalDomain,
};
pub use fields::{
    Access, Aggregation, Asset, Case, Context, DiscoveryItem, Display, Ensemble, Entity, Ert,
    ErtExperiment, File, FileSchema, Fmu, Masterdata, Model, Realization, Smda, SmdaItem, Ssdl,
    StandardResult, SystemInformation, Tracklog, TracklogEvent, User, VersionInfo, Workflow,
};
