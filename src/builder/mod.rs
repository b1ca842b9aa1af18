//! Metadata builders
//!
//! - [`MetadataBuilder`]: data object + settings + run context
//! - [`CaseMetadataBuilder`]: the case document written once per case
//! - [`RunRecordBuilder`]: ensemble and realization documents
//! - [`AggregationBuilder`]: one document from many realization documents
//!
//! Every builder pins its output to the active `fmu_results` version.
//! Builders never write to disk, except the case builder which owns the
//! case file.

mod aggregation;
mod case;
pub mod filename;
mod object_metadata;
mod run;
mod settings;

pub use aggregation::AggregationBuilder;
pub use case::CaseMetadataBuilder;
pub use object_metadata::{ExportPath, MetadataBuilder};
pub use run::RunRecordBuilder;
pub use settings::{ContentMetadata, ExportSettings, ResolvedTime, TimeEntry, TIMEDATA_FORMAT};

use crate::config::GlobalConfiguration;
use crate::metadata::{
    Access, Classification, Fmu, Masterdata, MetadataClass, MetadataDocument, Ssdl, Tracklog,
};
use crate::observability::{log_event, Event};
use crate::schema::{fmu_results_key, ACTIVE_VERSION};

/// Value of `source` in every document
pub const SOURCE: &str = "fmu";

/// Login name of the current user, for the tracklog
pub fn current_user() -> String {
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Skeleton document with header, tracklog and the given `fmu` block
pub(crate) fn new_document(
    class: MetadataClass,
    fmu: Fmu,
    access: Access,
    masterdata: Masterdata,
    user: &str,
) -> MetadataDocument {
    MetadataDocument {
        schema: fmu_results_key(ACTIVE_VERSION).id_url(),
        version: ACTIVE_VERSION.to_string(),
        source: SOURCE.to_string(),
        tracklog: Tracklog::initialize(user),
        class,
        fmu,
        file: None,
        data: None,
        display: None,
        access,
        masterdata,
        standard_result: None,
        preprocessed: None,
    }
}

/// `asset` is written as `restricted`
pub(crate) fn effective_classification(classification: Classification) -> Classification {
    match classification {
        Classification::Asset => {
            log_event(
                Event::ConfigWarning,
                &[
                    ("classification", Classification::Asset.as_str()),
                    ("using", Classification::Restricted.as_str()),
                ],
            );
            Classification::Restricted
        }
        other => other,
    }
}

/// The `access` block.
///
/// Classification: the override, else the configured default.
/// `rep_include`: the override, else the configured default, else false.
pub(crate) fn access_block(
    config: &GlobalConfiguration,
    classification: Option<Classification>,
    rep_include: Option<bool>,
) -> Access {
    let classification = classification
        .or_else(|| config.default_classification())
        .map(effective_classification)
        .unwrap_or(Classification::Internal);
    let rep_include = rep_include
        .or_else(|| config.default_rep_include())
        .unwrap_or(false);

    Access {
        asset: config.access.asset.clone(),
        classification: Some(classification),
        ssdl: Some(Ssdl {
            access_level: classification,
            rep_include,
        }),
    }
}
