//! Schema documents compiled into the binary

use super::types::SchemaKey;
use crate::metadata::StandardResultName;

/// Host the published schemas resolve under
pub const SCHEMA_BASE_URL: &str = "https://main-fmu-schemas-prod.radix.equinor.com";

/// Category of the metadata document schema
pub const FMU_RESULTS: &str = "fmu_results";

/// Category of payload file-format schemas
pub const FILE_FORMATS: &str = "file_formats";

/// Version new documents are built against
pub const ACTIVE_VERSION: &str = "0.10.0";

const FMU_RESULTS_0_8_0: &str = include_str!("../../schemas/fmu_results/0.8.0/fmu_results.json");
const FMU_RESULTS_0_10_0: &str =
    include_str!("../../schemas/fmu_results/0.10.0/fmu_results.json");
const FIELD_OUTLINE_0_1_0: &str =
    include_str!("../../schemas/file_formats/0.1.0/field_outline.json");
const INPLACE_VOLUMES_0_1_0: &str =
    include_str!("../../schemas/file_formats/0.1.0/inplace_volumes.json");

/// Key of the metadata schema for `version`
pub fn fmu_results_key(version: &str) -> SchemaKey {
    SchemaKey::new(FMU_RESULTS, version, FMU_RESULTS)
}

/// Key of the field outline payload schema
pub fn field_outline_key() -> SchemaKey {
    SchemaKey::new(FILE_FORMATS, "0.1.0", "field_outline")
}

/// Key of the inplace volumes standard result payload schema
pub fn inplace_volumes_key() -> SchemaKey {
    SchemaKey::new(FILE_FORMATS, "0.1.0", "inplace_volumes")
}

/// Payload schema of a standard result
pub fn standard_result_key(name: StandardResultName) -> SchemaKey {
    match name {
        StandardResultName::InplaceVolumes => inplace_volumes_key(),
    }
}

/// Built-in documents, oldest first within each category
pub fn builtin() -> Vec<(SchemaKey, &'static str)> {
    vec![
        (fmu_results_key("0.8.0"), FMU_RESULTS_0_8_0),
        (fmu_results_key(ACTIVE_VERSION), FMU_RESULTS_0_10_0),
        (field_outline_key(), FIELD_OUTLINE_0_1_0),
        (inplace_volumes_key(), INPLACE_VOLUMES_0_1_0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_match_keys() {
        for (key, content) in builtin() {
            let doc: serde_json::Value = serde_json::from_str(content).unwrap();
            assert_eq!(doc["$id"], key.id_url());
            assert_eq!(doc["version"], key.version);
        }
    }
}
