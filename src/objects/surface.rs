//! Regular 2D surface, written as IRAP ASCII

use std::io::Write;

use super::{write_wrapped, DataObject};
use crate::error::{DataioError, DataioResult};
use crate::metadata::{
    BoundingBox, FileFormat, Layout, MetadataClass, Specification, SurfaceSpec,
};

/// Value IRAP uses for undefined nodes
pub const IRAP_UNDEF: f64 = 9_999_900.0;

const IRAP_MAGIC: i32 = -996;
const VALUES_PER_LINE: usize = 6;

/// A rotated regular grid of z values.
///
/// Node `(i, j)` is at index `j * ncol + i`; `i` runs along the x axis.
/// `None` marks an undefined node.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularSurface {
    name: Option<String>,
    ncol: u32,
    nrow: u32,
    xori: f64,
    yori: f64,
    xinc: f64,
    yinc: f64,
    yflip: i8,
    rotation: f64,
    values: Vec<Option<f64>>,
}

impl RegularSurface {
    pub fn new(
        ncol: u32,
        nrow: u32,
        origin: (f64, f64),
        increment: (f64, f64),
        values: Vec<Option<f64>>,
    ) -> DataioResult<Self> {
        if ncol == 0 || nrow == 0 {
            return Err(DataioError::invalid_input("surface needs ncol and nrow >= 1"));
        }
        if !(increment.0 > 0.0 && increment.1 > 0.0) {
            return Err(DataioError::invalid_input("surface increments must be positive"));
        }
        let expected = ncol as usize * nrow as usize;
        if values.len() != expected {
            return Err(DataioError::invalid_input(format!(
                "surface has {} values, expected ncol * nrow = {}",
                values.len(),
                expected
            )));
        }
        Ok(Self {
            name: None,
            ncol,
            nrow,
            xori: origin.0,
            yori: origin.1,
            xinc: increment.0,
            yinc: increment.1,
            yflip: 1,
            rotation: 0.0,
            values,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Rotation in degrees, counter-clockwise around the origin
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_yflip(mut self, flipped: bool) -> Self {
        self.yflip = if flipped { -1 } else { 1 };
        self
    }

    pub fn value(&self, i: u32, j: u32) -> Option<f64> {
        if i >= self.ncol || j >= self.nrow {
            return None;
        }
        self.values[(j * self.ncol + i) as usize]
    }

    fn node_xy(&self, i: f64, j: f64) -> (f64, f64) {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let dx = i * self.xinc;
        let dy = j * self.yinc * f64::from(self.yflip);
        (
            self.xori + dx * cos - dy * sin,
            self.yori + dx * sin + dy * cos,
        )
    }

    fn z_range(&self) -> Option<(f64, f64)> {
        self.values.iter().flatten().fold(None, |acc, &z| match acc {
            None => Some((z, z)),
            Some((lo, hi)) => Some((lo.min(z), hi.max(z))),
        })
    }
}

impl DataObject for RegularSurface {
    fn class(&self) -> MetadataClass {
        MetadataClass::Surface
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn default_folder(&self) -> &'static str {
        "maps"
    }

    fn extension(&self) -> &'static str {
        ".gri"
    }

    fn format(&self) -> FileFormat {
        FileFormat::IrapAscii
    }

    fn layout(&self) -> Layout {
        Layout::Regular
    }

    fn spec(&self) -> Option<Specification> {
        Some(Specification::Surface(SurfaceSpec {
            ncol: self.ncol,
            nrow: self.nrow,
            xori: self.xori,
            yori: self.yori,
            xinc: self.xinc,
            yinc: self.yinc,
            yflip: self.yflip,
            rotation: self.rotation,
            undef: Some(IRAP_UNDEF),
        }))
    }

    fn bbox(&self) -> Option<BoundingBox> {
        let imax = f64::from(self.ncol - 1);
        let jmax = f64::from(self.nrow - 1);
        let corners = [(0.0, 0.0), (imax, 0.0), (0.0, jmax), (imax, jmax)];

        let mut bbox: Option<BoundingBox> = None;
        for (i, j) in corners {
            let (x, y) = self.node_xy(i, j);
            bbox = Some(match bbox {
                None => BoundingBox::new_2d(x, x, y, y),
                Some(b) => BoundingBox::new_2d(b.xmin.min(x), b.xmax.max(x), b.ymin.min(y), b.ymax.max(y)),
            });
        }
        match (bbox, self.z_range()) {
            (Some(b), Some((zmin, zmax))) => Some(b.with_z(zmin, zmax)),
            (b, _) => b,
        }
    }

    fn write_payload(&self, out: &mut Vec<u8>) -> DataioResult<()> {
        let xmax = self.xori + f64::from(self.ncol - 1) * self.xinc;
        let ymax = self.yori + f64::from(self.nrow - 1) * self.yinc;

        writeln!(out, "{} {} {:.6} {:.6}", IRAP_MAGIC, self.nrow, self.xinc, self.yinc)?;
        writeln!(out, "{:.6} {:.6} {:.6} {:.6}", self.xori, xmax, self.yori, ymax)?;
        writeln!(out, "{} {:.6} {:.6} {:.6}", self.ncol, self.rotation, self.xori, self.yori)?;
        writeln!(out, "0 0 0 0 0 0 0")?;
        write_wrapped(out, &self.values, VALUES_PER_LINE, |v| {
            format!("{:.4}", v.unwrap_or(IRAP_UNDEF))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> RegularSurface {
        let values = (0..6).map(|v| Some(1000.0 + v as f64)).collect();
        RegularSurface::new(3, 2, (100.0, 200.0), (25.0, 50.0), values).unwrap()
    }

    #[test]
    fn test_rejects_wrong_value_count() {
        let err = RegularSurface::new(3, 2, (0.0, 0.0), (1.0, 1.0), vec![Some(1.0)]).unwrap_err();
        assert!(matches!(err, DataioError::InvalidInput(_)));
    }

    #[test]
    fn test_unrotated_bbox() {
        let bbox = surface().bbox().unwrap();
        assert_eq!((bbox.xmin, bbox.xmax), (100.0, 150.0));
        assert_eq!((bbox.ymin, bbox.ymax), (200.0, 250.0));
        assert_eq!((bbox.zmin, bbox.zmax), (Some(1000.0), Some(1005.0)));
    }

    #[test]
    fn test_rotated_bbox() {
        let bbox = surface().with_rotation(90.0).bbox().unwrap();
        assert!((bbox.xmin - 50.0).abs() < 1e-9);
        assert!((bbox.xmax - 100.0).abs() < 1e-9);
        assert!((bbox.ymin - 200.0).abs() < 1e-9);
        assert!((bbox.ymax - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_undefined_nodes_excluded_from_z_range() {
        let s = RegularSurface::new(2, 1, (0.0, 0.0), (1.0, 1.0), vec![None, Some(5.0)]).unwrap();
        let bbox = s.bbox().unwrap();
        assert_eq!(bbox.zmin, Some(5.0));
        assert_eq!(s.value(0, 0), None);
    }

    #[test]
    fn test_irap_ascii_layout() {
        let s = RegularSurface::new(
            7,
            1,
            (0.0, 0.0),
            (1.0, 1.0),
            vec![Some(1.0), None, Some(3.0), Some(4.0), Some(5.0), Some(6.0), Some(7.0)],
        )
        .unwrap();
        let text = String::from_utf8(s.to_payload().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("-996 1 "));
        assert!(lines[2].starts_with("7 "));
        assert_eq!(lines[3], "0 0 0 0 0 0 0");
        assert_eq!(lines[4].split_whitespace().count(), 6);
        assert!(lines[4].contains("9999900.0000"));
        assert_eq!(lines[5].trim(), "7.0000");
    }

    #[test]
    fn test_spec_matches_geometry() {
        match surface().spec() {
            Some(Specification::Surface(spec)) => {
                assert_eq!((spec.ncol, spec.nrow), (3, 2));
                assert_eq!(spec.xinc, 25.0);
                assert_eq!(spec.undef, Some(IRAP_UNDEF));
            }
            other => panic!("unexpected spec {:?}", other),
        }
    }
}
