//! Free-form key/value objects, written as JSON

use serde_json::{Map, Value};

use super::DataObject;
use crate::error::DataioResult;
use crate::metadata::{BoundingBox, FileFormat, Layout, MetadataClass, Specification};

#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary {
    name: Option<String>,
    entries: Map<String, Value>,
}

impl Dictionary {
    pub fn new(entries: Map<String, Value>) -> Self {
        Self { name: None, entries }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }
}

impl DataObject for Dictionary {
    fn class(&self) -> MetadataClass {
        MetadataClass::Dictionary
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn default_folder(&self) -> &'static str {
        "dictionaries"
    }

    fn extension(&self) -> &'static str {
        ".json"
    }

    fn format(&self) -> FileFormat {
        FileFormat::Json
    }

    fn layout(&self) -> Layout {
        Layout::Dictionary
    }

    fn spec(&self) -> Option<Specification> {
        None
    }

    fn bbox(&self) -> Option<BoundingBox> {
        None
    }

    fn write_payload(&self, out: &mut Vec<u8>) -> DataioResult<()> {
        serde_json::to_writer_pretty(&mut *out, &self.entries)?;
        out.push(b'\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_is_json() {
        let Value::Object(map) = json!({"KRW_END": 0.6, "SWL": 0.12}) else {
            unreachable!()
        };
        let dict = Dictionary::new(map).with_name("relperm_params");
        let bytes = dict.to_payload().unwrap();
        let parsed: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed["SWL"], 0.12);
        assert_eq!(dict.name(), Some("relperm_params"));
    }
}
