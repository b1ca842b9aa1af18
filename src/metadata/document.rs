//! Metadata document and its sidecar encoding

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::data::Data;
use super::enums::{ContextStage, MetadataClass};
use super::fields::{Access, Display, File, Fmu, Masterdata, StandardResult, Tracklog};
use crate::error::{DataioError, DataioResult};

/// Encoding of a sidecar file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaFormat {
    #[default]
    Yaml,
    Json,
}

impl MetaFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            MetaFormat::Yaml => "yml",
            MetaFormat::Json => "json",
        }
    }

    /// Guesses the format from a file extension, defaulting to YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => MetaFormat::Json,
            _ => MetaFormat::Yaml,
        }
    }
}

/// A complete metadata document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataDocument {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub version: String,
    pub source: String,
    pub tracklog: Tracklog,
    pub class: MetadataClass,
    pub fmu: Fmu,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<File>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Data>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<Display>,
    pub access: Access,
    pub masterdata: Masterdata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_result: Option<StandardResult>,
    #[serde(rename = "_preprocessed", default, skip_serializing_if = "Option::is_none")]
    pub preprocessed: Option<bool>,
}

impl MetadataDocument {
    pub fn stage(&self) -> ContextStage {
        self.fmu.context.stage
    }

    pub fn to_json_value(&self) -> DataioResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_string(&self) -> DataioResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml_string(&self) -> DataioResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_json_str(raw: &str) -> DataioResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_yaml_str(raw: &str) -> DataioResult<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Encodes the document for a sidecar file
    pub fn encode(&self, format: MetaFormat) -> DataioResult<Vec<u8>> {
        let text = match format {
            MetaFormat::Yaml => self.to_yaml_string()?,
            MetaFormat::Json => self.to_json_string()?,
        };
        Ok(text.into_bytes())
    }

    /// Decodes sidecar bytes
    pub fn decode(bytes: &[u8], format: MetaFormat) -> DataioResult<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| DataioError::Serialization(format!("sidecar is not UTF-8: {}", e)))?;
        match format {
            MetaFormat::Yaml => Self::from_yaml_str(text),
            MetaFormat::Json => Self::from_json_str(text),
        }
    }
}

/// Reads a metadata file into untyped JSON, whatever its encoding
pub fn read_value(raw: &str, format: MetaFormat) -> DataioResult<Value> {
    Ok(match format {
        MetaFormat::Yaml => serde_yaml::from_str(raw)?,
        MetaFormat::Json => serde_json::from_str(raw)?,
    })
}

/// `<dir>/.<filename>.<ext>` next to a data file
pub fn sidecar_path(data_path: &Path, format: MetaFormat) -> PathBuf {
    let file_name = data_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let sidecar = format!(".{}.{}", file_name, format.extension());
    match data_path.parent() {
        Some(parent) => parent.join(sidecar),
        None => PathBuf::from(sidecar),
    }
}
