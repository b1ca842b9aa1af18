//! Closed polygons, written as CSV

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DataObject;
use crate::error::{DataioError, DataioResult};
use crate::metadata::{
    BoundingBox, FileFormat, Layout, MetadataClass, PolygonsSpec, Specification,
};

/// One vertex. Serialized with the CSV column names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolygonPoint {
    #[serde(rename = "X_UTME")]
    pub x: f64,
    #[serde(rename = "Y_UTMN")]
    pub y: f64,
    #[serde(rename = "Z_TVDSS")]
    pub z: f64,
    #[serde(rename = "POLY_ID")]
    pub poly_id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polygons {
    name: Option<String>,
    points: Vec<PolygonPoint>,
}

impl Polygons {
    pub fn new(points: Vec<PolygonPoint>) -> DataioResult<Self> {
        if points.iter().any(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite())) {
            return Err(DataioError::invalid_input("polygon coordinates must be finite"));
        }
        Ok(Self { name: None, points })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn points(&self) -> &[PolygonPoint] {
        &self.points
    }

    pub fn npolys(&self) -> usize {
        self.points
            .iter()
            .map(|p| p.poly_id)
            .collect::<BTreeSet<_>>()
            .len()
    }
}

impl DataObject for Polygons {
    fn class(&self) -> MetadataClass {
        MetadataClass::Polygons
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn default_folder(&self) -> &'static str {
        "polygons"
    }

    fn extension(&self) -> &'static str {
        ".csv"
    }

    fn format(&self) -> FileFormat {
        FileFormat::Csv
    }

    fn layout(&self) -> Layout {
        Layout::Unset
    }

    fn spec(&self) -> Option<Specification> {
        Some(Specification::Polygons(PolygonsSpec {
            npolys: self.npolys() as u64,
        }))
    }

    fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.points.iter().map(|p| (p.x, p.y, p.z)))
    }

    fn payload_rows(&self) -> Option<Value> {
        serde_json::to_value(&self.points).ok()
    }

    fn write_payload(&self, out: &mut Vec<u8>) -> DataioResult<()> {
        let mut writer = csv::Writer::from_writer(out);
        for point in &self.points {
            writer.serialize(point)?;
        }
        writer.flush()?;
        Ok(())
    }
}
