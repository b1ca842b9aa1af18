//! Global configuration (`global_variables.yml`)
//!
//! Only the blocks the metadata builder consumes are modelled: `access`,
//! `masterdata`, `model` and `stratigraphy`. Other keys in the file are
//! ignored.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DataioError, DataioResult};
use crate::metadata::{Asset, Classification, Masterdata, Model};
use crate::observability::{log_event, Event};

/// Environment variable naming the global configuration file
pub const GLOBAL_CONFIG_ENV: &str = "FMU_GLOBAL_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsdlConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_level: Option<Classification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rep_include: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    pub asset: Asset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssdl: Option<SsdlConfig>,
}

/// One entry of the `stratigraphy` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratigraphyElement {
    pub name: String,
    #[serde(default)]
    pub stratigraphic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<Vec<Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stratigraphic_alias: Option<Vec<Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
}

impl StratigraphyElement {
    /// Aliases with empty entries removed
    pub fn aliases(&self) -> Vec<String> {
        flatten_aliases(&self.alias)
    }

    pub fn stratigraphic_aliases(&self) -> Vec<String> {
        flatten_aliases(&self.stratigraphic_alias)
    }
}

fn flatten_aliases(list: &Option<Vec<Option<String>>>) -> Vec<String> {
    list.iter()
        .flatten()
        .flatten()
        .filter(|s| !s.is_empty())
        .cloned()
        .collect()
}

/// Parsed and normalized global configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfiguration {
    pub access: AccessConfig,
    pub masterdata: Masterdata,
    pub model: Model,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stratigraphy: Option<BTreeMap<String, StratigraphyElement>>,
}

impl GlobalConfiguration {
    /// Loads and normalizes a YAML file
    pub fn load(path: &Path) -> DataioResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            DataioError::invalid_config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        let config = Self::from_yaml_str(&raw)?;
        log_event(
            Event::ConfigLoaded,
            &[
                ("asset", &config.access.asset.name),
                ("path", &path.display().to_string()),
            ],
        );
        Ok(config)
    }

    /// Loads the file named by `FMU_GLOBAL_CONFIG`
    pub fn from_env() -> DataioResult<Self> {
        let path = std::env::var(GLOBAL_CONFIG_ENV).map_err(|_| {
            DataioError::invalid_config(format!("{} is not set", GLOBAL_CONFIG_ENV))
        })?;
        Self::load(Path::new(&path))
    }

    /// Parses and normalizes YAML text
    pub fn from_yaml_str(raw: &str) -> DataioResult<Self> {
        let config: Self = serde_yaml::from_str(raw)
            .map_err(|e| DataioError::invalid_config(format!("invalid global config: {}", e)))?;
        config.normalize()
    }

    /// Fills `classification` from `ssdl.access_level` and prunes empty
    /// aliases.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when neither a classification nor an access level is
    /// given, or a stratigraphy entry has an empty name.
    pub fn normalize(mut self) -> DataioResult<Self> {
        let access_level = self.access.ssdl.as_ref().and_then(|s| s.access_level);

        match (self.access.classification, access_level) {
            (None, None) => {
                return Err(DataioError::invalid_config(
                    "access.classification (or access.ssdl.access_level) must be set",
                ))
            }
            (None, Some(level)) => self.access.classification = Some(level),
            (Some(classification), Some(level)) if classification != level => {
                log_event(
                    Event::ConfigWarning,
                    &[
                        ("classification", classification.as_str()),
                        ("ssdl_access_level", level.as_str()),
                        ("using", classification.as_str()),
                    ],
                );
            }
            _ => {}
        }

        if let Some(strat) = self.stratigraphy.as_mut() {
            for (key, element) in strat.iter_mut() {
                if element.name.trim().is_empty() {
                    return Err(DataioError::invalid_config(format!(
                        "stratigraphy entry '{}' has an empty name",
                        key
                    )));
                }
                element.alias = element.alias.take().map(|list| {
                    list.into_iter()
                        .flatten()
                        .filter(|s| !s.is_empty())
                        .map(Some)
                        .collect()
                });
                element.stratigraphic_alias = element.stratigraphic_alias.take().map(|list| {
                    list.into_iter()
                        .flatten()
                        .filter(|s| !s.is_empty())
                        .map(Some)
                        .collect()
                });
            }
        }
        Ok(self)
    }

    /// Classification used when the caller gives none
    pub fn default_classification(&self) -> Option<Classification> {
        self.access
            .classification
            .or_else(|| self.access.ssdl.as_ref().and_then(|s| s.access_level))
    }

    /// `rep_include` used when the caller gives none
    pub fn default_rep_include(&self) -> Option<bool> {
        self.access.ssdl.as_ref().and_then(|s| s.rep_include)
    }

    /// Looks up a name in the stratigraphy block
    pub fn stratigraphy_entry(&self, name: &str) -> Option<&StratigraphyElement> {
        self.stratigraphy.as_ref().and_then(|s| s.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
model:
  name: ff
  revision: 21.1.0
masterdata:
  smda:
    country:
      - identifier: Norway
        uuid: ad214d85-8a1d-19da-e053-c918a4889309
    discovery:
      - short_identifier: DROGON
        uuid: ad214d85-8a1d-19da-e053-c918a4889309
    field:
      - identifier: DROGON
        uuid: 00000000-0000-0000-0000-000000000000
    coordinate_system:
      identifier: ST_WGS84_UTM37N_P32637
      uuid: ad214d85-dac7-19da-e053-c918a4889309
    stratigraphic_column:
      identifier: DROGON_HAS_NO_STRATCOLUMN
      uuid: 00000000-0000-0000-0000-000000000000
access:
  asset:
    name: Drogon
  ssdl:
    access_level: internal
    rep_include: true
stratigraphy:
  TopVolantis:
    stratigraphic: true
    name: VOLANTIS GP. Top
    alias:
      - TopVOLANTIS
      - null
      - TOP_VOLANTIS
"#;

    #[test]
    fn test_classification_mirrors_access_level() {
        let config = GlobalConfiguration::from_yaml_str(CONFIG).unwrap();
        assert_eq!(config.access.classification, Some(Classification::Internal));
        assert_eq!(config.default_rep_include(), Some(true));
    }

    #[test]
    fn test_missing_classification_rejected() {
        let raw = CONFIG.replace("    access_level: internal\n", "");
        let err = GlobalConfiguration::from_yaml_str(&raw).unwrap_err();
        assert!(matches!(err, DataioError::InvalidConfig(_)));
    }

    #[test]
    fn test_null_aliases_pruned() {
        let config = GlobalConfiguration::from_yaml_str(CONFIG).unwrap();
        let entry = config.stratigraphy_entry("TopVolantis").unwrap();
        assert_eq!(entry.aliases(), vec!["TopVOLANTIS", "TOP_VOLANTIS"]);
        assert_eq!(entry.alias.as_ref().unwrap().len(), 2);
        assert!(entry.stratigraphic);
    }

    #[test]
    fn test_explicit_classification_wins() {
        let raw = CONFIG.replace(
            "  asset:\n    name: Drogon\n",
            "  asset:\n    name: Drogon\n  classification: restricted\n",
        );
        let config = GlobalConfiguration::from_yaml_str(&raw).unwrap();
        assert_eq!(config.default_classification(), Some(Classification::Restricted));
    }

    #[test]
    fn test_load_missing_file() {
        let err = GlobalConfiguration::load(Path::new("/nonexistent/global_variables.yml"))
            .unwrap_err();
        assert!(matches!(err, DataioError::InvalidConfig(_)));
    }
}
