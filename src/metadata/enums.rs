//! Closed vocabularies of the metadata document

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Declares a string-valued enum with serde names, `as_str`, `Display`
/// and `FromStr` that all agree.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Every value, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err(format!(
                        "'{}' is not a valid {} (expected one of: {})",
                        other,
                        stringify!($name),
                        [$($text),+].join(", ")
                    )),
                }
            }
        }
    };
}

string_enum! {
    /// Document class
    pub enum MetadataClass {
        Case => "case",
        Ensemble => "ensemble",
        Realization => "realization",
        Surface => "surface",
        Table => "table",
        Cpgrid => "cpgrid",
        CpgridProperty => "cpgrid_property",
        Polygons => "polygons",
        Points => "points",
        Cube => "cube",
        Dictionary => "dictionary",
    }
}

impl MetadataClass {
    /// Classes describing a run context rather than a data object
    pub fn is_context_class(&self) -> bool {
        matches!(
            self,
            MetadataClass::Case | MetadataClass::Ensemble | MetadataClass::Realization
        )
    }
}

string_enum! {
    /// Whitelisted `data.content` values
    pub enum Content {
        Depth => "depth",
        Time => "time",
        Thickness => "thickness",
        Property => "property",
        Seismic => "seismic",
        FluidContact => "fluid_contact",
        FieldOutline => "field_outline",
        FieldRegion => "field_region",
        Regions => "regions",
        Pinchout => "pinchout",
        Subcrop => "subcrop",
        FaultLines => "fault_lines",
        FaultProperties => "fault_properties",
        Velocity => "velocity",
        Volumes => "volumes",
        Khproduct => "khproduct",
        Timeseries => "timeseries",
        Wellpicks => "wellpicks",
        Parameters => "parameters",
        Relperm => "relperm",
        Pvt => "pvt",
        LiftCurves => "lift_curves",
        Rft => "rft",
        Transmissibilities => "transmissibilities",
        NamedArea => "named_area",
    }
}

impl Content {
    /// Contents that carry their own block under `data`
    pub fn requires_metadata(&self) -> bool {
        matches!(
            self,
            Content::FieldOutline | Content::FluidContact | Content::FieldRegion | Content::Seismic
        )
    }

    pub fn requires_vertical_domain(&self) -> bool {
        matches!(self, Content::Depth | Content::Time)
    }
}

string_enum! {
    /// `fmu.context.stage`
    pub enum ContextStage {
        Case => "case",
        Ensemble => "ensemble",
        Realization => "realization",
        /// Pre-0.10 name of the ensemble stage
        Iteration => "iteration",
    }
}

impl ContextStage {
    /// Maps the legacy name onto its current equivalent
    pub fn normalized(self) -> Self {
        match self {
            ContextStage::Iteration => ContextStage::Ensemble,
            other => other,
        }
    }
}

string_enum! {
    /// Security classification
    pub enum Classification {
        Internal => "internal",
        Restricted => "restricted",
        /// Deprecated; treated as restricted
        Asset => "asset",
    }
}

string_enum! {
    pub enum TracklogEventType {
        Created => "created",
        Updated => "updated",
        Merged => "merged",
    }
}

string_enum! {
    pub enum VerticalDomain {
        Depth => "depth",
        Time => "time",
    }
}

string_enum! {
    pub enum DomainReference {
        Msl => "msl",
        Sb => "sb",
        Rkb => "rkb",
    }
}

string_enum! {
    /// Payload file format
    pub enum FileFormat {
        IrapAscii => "irap_ascii",
        IrapBinary => "irap_binary",
        Csv => "csv",
        Parquet => "parquet",
        Grdecl => "grdecl",
        Roff => "roff",
        Segy => "segy",
        Json => "json",
    }
}

string_enum! {
    pub enum Layout {
        Regular => "regular",
        Cornerpoint => "cornerpoint",
        Table => "table",
        Dictionary => "dictionary",
        Triangulated => "triangulated",
        Unset => "unset",
    }
}

string_enum! {
    /// ERT run mode, from `_ERT_SIMULATION_MODE`
    pub enum SimulationMode {
        EnsembleExperiment => "ensemble_experiment",
        EnsembleInformationFilter => "ensemble_information_filter",
        EnsembleSmoother => "ensemble_smoother",
        EsMda => "es_mda",
        EvaluateEnsemble => "evaluate_ensemble",
        ManualUpdate => "manual_update",
        TestRun => "test_run",
        Workflow => "workflow",
    }
}

string_enum! {
    /// Agreed result formats a data object can be exported as
    pub enum StandardResultName {
        InplaceVolumes => "inplace_volumes",
    }
}

impl StandardResultName {
    /// The `data.content` a standard result is exported with
    pub fn content(&self) -> Content {
        match self {
            StandardResultName::InplaceVolumes => Content::Volumes,
        }
    }

    pub fn class(&self) -> MetadataClass {
        match self {
            StandardResultName::InplaceVolumes => MetadataClass::Table,
        }
    }
}

string_enum! {
    pub enum FluidContactType {
        Fgl => "fgl",
        Fwl => "fwl",
        Goc => "goc",
        Gwc => "gwc",
        Owc => "owc",
    }
}
