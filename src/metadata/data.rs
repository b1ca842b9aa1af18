//! The `data` block

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{Content, DomainReference, FileFormat, FluidContactType, Layout, VerticalDomain};

/// A stratigraphic layer referenced by `top`/`base`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    #[serde(default)]
    pub stratigraphic: bool,
    #[serde(default)]
    pub offset: f64,
}

/// 2D box, or 3D when the z pair is present
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zmin: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zmax: Option<f64>,
}

impl BoundingBox {
    pub fn new_2d(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
            zmin: None,
            zmax: None,
        }
    }

    pub fn with_z(mut self, zmin: f64, zmax: f64) -> Self {
        self.zmin = Some(zmin);
        self.zmax = Some(zmax);
        self
    }

    /// Smallest box around a set of points; `None` when empty
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64, f64)>) -> Option<Self> {
        let mut iter = points.into_iter();
        let (x, y, z) = iter.next()?;
        let mut bbox = Self::new_2d(x, x, y, y).with_z(z, z);
        for (x, y, z) in iter {
            bbox.xmin = bbox.xmin.min(x);
            bbox.xmax = bbox.xmax.max(x);
            bbox.ymin = bbox.ymin.min(y);
            bbox.ymax = bbox.ymax.max(y);
            bbox.zmin = bbox.zmin.map(|v| v.min(z));
            bbox.zmax = bbox.zmax.map(|v| v.max(z));
        }
        Some(bbox)
    }
}

fn default_yflip() -> i8 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSpec {
    pub ncol: u32,
    pub nrow: u32,
    pub xori: f64,
    pub yori: f64,
    pub xinc: f64,
    pub yinc: f64,
    #[serde(default = "default_yflip")]
    pub yflip: i8,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undef: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpGridSpec {
    pub ncol: u32,
    pub nrow: u32,
    pub nlay: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    pub columns: Vec<String>,
    pub num_columns: u64,
    pub num_rows: u64,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolygonsSpec {
    pub npolys: u64,
}

/// `data.spec`, shaped by the document class
///
/// Variants are tried in declaration order when parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Specification {
    Surface(SurfaceSpec),
    CpGrid(CpGridSpec),
    Table(TableSpec),
    Polygons(PolygonsSpec),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub value: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Time {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t0: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t1: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOutline {
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluidContact {
    pub contact: FluidContactType,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRegion {
    pub id: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Seismic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacking_offset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zrange: Option<f64>,
}

/// The `data` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Data {
    pub name: String,
    #[serde(default)]
    pub stratigraphic: bool,
    #[serde(default)]
    pub offset: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stratigraphic_alias: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<Layer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Layer>,
    pub content: Content,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagname: Option<String>,
    pub format: FileFormat,
    pub layout: Layout,
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_domain: Option<VerticalDomain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_reference: Option<DomainReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<Specification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Time>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_index: Option<Vec<String>>,
    #[serde(default)]
    pub undef_is_zero: bool,
    #[serde(default)]
    pub is_prediction: bool,
    #[serde(default)]
    pub is_observation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_outline: Option<FieldOutline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fluid_contact: Option<FluidContact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_region: Option<FieldRegion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seismic: Option<Seismic>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_spec_variants_parse_by_shape() {
        let surface: Specification = serde_json::from_value(json!({
            "ncol": 3, "nrow": 2, "xori": 0.0, "yori": 0.0, "xinc": 25.0, "yinc": 25.0
        }))
        .unwrap();
        match surface {
            Specification::Surface(spec) => {
                assert_eq!(spec.yflip, 1);
                assert_eq!(spec.rotation, 0.0);
            }
            other => panic!("expected surface spec, got {:?}", other),
        }

        let grid: Specification =
            serde_json::from_value(json!({"ncol": 4, "nrow": 3, "nlay": 2})).unwrap();
        assert!(matches!(grid, Specification::CpGrid(_)));

        let table: Specification = serde_json::from_value(json!({
            "columns": ["ZONE", "STOIIP"], "num_columns": 2, "num_rows": 5, "size": 10
        }))
        .unwrap();
        assert!(matches!(table, Specification::Table(_)));

        let polys: Specification = serde_json::from_value(json!({"npolys": 2})).unwrap();
        assert!(matches!(polys, Specification::Polygons(_)));
    }

    #[test]
    fn test_bbox_from_points() {
        let bbox = BoundingBox::from_points(vec![(1.0, 5.0, 10.0), (-2.0, 7.0, 3.0)]).unwrap();
        assert_eq!(bbox.xmin, -2.0);
        assert_eq!(bbox.xmax, 1.0);
        assert_eq!(bbox.ymin, 5.0);
        assert_eq!(bbox.ymax, 7.0);
        assert_eq!(bbox.zmin, Some(3.0));
        assert_eq!(bbox.zmax, Some(10.0));
        assert!(BoundingBox::from_points(Vec::new()).is_none());
    }

    #[test]
    fn test_2d_bbox_omits_z() {
        let json = serde_json::to_value(BoundingBox::new_2d(0.0, 1.0, 0.0, 1.0)).unwrap();
        assert!(json.get("zmin").is_none());
    }
}
