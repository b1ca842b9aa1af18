//! Corner-point grids and grid properties, written as GRDECL

use std::io::Write;

use super::{write_wrapped, DataObject};
use crate::error::{DataioError, DataioResult};
use crate::metadata::{
    BoundingBox, CpGridSpec, FileFormat, Layout, MetadataClass, Specification,
};

const VALUES_PER_LINE: usize = 6;

fn cell_count(ncol: u32, nrow: u32, nlay: u32) -> usize {
    ncol as usize * nrow as usize * nlay as usize
}

fn check_dimensions(ncol: u32, nrow: u32, nlay: u32) -> DataioResult<()> {
    if ncol == 0 || nrow == 0 || nlay == 0 {
        return Err(DataioError::invalid_input(
            "grid dimensions must all be >= 1",
        ));
    }
    Ok(())
}

/// Corner-point grid geometry in Eclipse layout.
///
/// - `coord`: `(ncol+1) * (nrow+1)` pillars of six values (top xyz, bottom xyz)
/// - `zcorn`: eight corner depths per cell
/// - `actnum`: one flag per cell
#[derive(Debug, Clone, PartialEq)]
pub struct CornerPointGrid {
    name: Option<String>,
    ncol: u32,
    nrow: u32,
    nlay: u32,
    coord: Vec<f64>,
    zcorn: Vec<f64>,
    actnum: Vec<bool>,
}

impl CornerPointGrid {
    pub fn new(
        dimensions: (u32, u32, u32),
        coord: Vec<f64>,
        zcorn: Vec<f64>,
        actnum: Vec<bool>,
    ) -> DataioResult<Self> {
        let (ncol, nrow, nlay) = dimensions;
        check_dimensions(ncol, nrow, nlay)?;
        let cells = cell_count(ncol, nrow, nlay);
        let pillars = (ncol as usize + 1) * (nrow as usize + 1);

        if coord.len() != pillars * 6 {
            return Err(DataioError::invalid_input(format!(
                "COORD has {} values, expected {}",
                coord.len(),
                pillars * 6
            )));
        }
        if zcorn.len() != cells * 8 {
            return Err(DataioError::invalid_input(format!(
                "ZCORN has {} values, expected {}",
                zcorn.len(),
                cells * 8
            )));
        }
        if actnum.len() != cells {
            return Err(DataioError::invalid_input(format!(
                "ACTNUM has {} values, expected {}",
                actnum.len(),
                cells
            )));
        }
        Ok(Self {
            name: None,
            ncol,
            nrow,
            nlay,
            coord,
            zcorn,
            actnum,
        })
    }

    /// Axis-aligned box grid with all cells active
    pub fn box_grid(
        dimensions: (u32, u32, u32),
        origin: (f64, f64, f64),
        increment: (f64, f64, f64),
    ) -> DataioResult<Self> {
        let (ncol, nrow, nlay) = dimensions;
        check_dimensions(ncol, nrow, nlay)?;
        let (x0, y0, z0) = origin;
        let (dx, dy, dz) = increment;
        let ztop = z0;
        let zbot = z0 + f64::from(nlay) * dz;

        let mut coord = Vec::with_capacity((ncol as usize + 1) * (nrow as usize + 1) * 6);
        for j in 0..=nrow {
            for i in 0..=ncol {
                let x = x0 + f64::from(i) * dx;
                let y = y0 + f64::from(j) * dy;
                coord.extend_from_slice(&[x, y, ztop, x, y, zbot]);
            }
        }

        // Eclipse ZCORN order: per layer, top face then bottom face; per
        // face, rows of 2*ncol corners repeated for the two row edges.
        let corners_per_face = 4 * ncol as usize * nrow as usize;
        let mut zcorn = Vec::with_capacity(corners_per_face * 2 * nlay as usize);
        for k in 0..nlay {
            let top = z0 + f64::from(k) * dz;
            let bottom = top + dz;
            zcorn.extend(std::iter::repeat(top).take(corners_per_face));
            zcorn.extend(std::iter::repeat(bottom).take(corners_per_face));
        }

        let actnum = vec![true; cell_count(ncol, nrow, nlay)];
        Self::new(dimensions, coord, zcorn, actnum)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn dimensions(&self) -> (u32, u32, u32) {
        (self.ncol, self.nrow, self.nlay)
    }
}

impl DataObject for CornerPointGrid {
    fn class(&self) -> MetadataClass {
        MetadataClass::Cpgrid
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn default_folder(&self) -> &'static str {
        "grids"
    }

    fn extension(&self) -> &'static str {
        ".grdecl"
    }

    fn format(&self) -> FileFormat {
        FileFormat::Grdecl
    }

    fn layout(&self) -> Layout {
        Layout::Cornerpoint
    }

    fn spec(&self) -> Option<Specification> {
        Some(Specification::CpGrid(CpGridSpec {
            ncol: self.ncol,
            nrow: self.nrow,
            nlay: self.nlay,
        }))
    }

    fn bbox(&self) -> Option<BoundingBox> {
        let xy = BoundingBox::from_points(
            self.coord
                .chunks_exact(3)
                .map(|p| (p[0], p[1], p[2])),
        )?;
        let (zmin, zmax) = self
            .zcorn
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &z| {
                (lo.min(z), hi.max(z))
            });
        Some(BoundingBox::new_2d(xy.xmin, xy.xmax, xy.ymin, xy.ymax).with_z(zmin, zmax))
    }

    fn write_payload(&self, out: &mut Vec<u8>) -> DataioResult<()> {
        writeln!(out, "SPECGRID")?;
        writeln!(out, " {} {} {} 1 F /", self.ncol, self.nrow, self.nlay)?;
        writeln!(out)?;
        writeln!(out, "COORD")?;
        write_wrapped(out, &self.coord, VALUES_PER_LINE, |v| format!("{:.4}", v))?;
        writeln!(out, " /")?;
        writeln!(out)?;
        writeln!(out, "ZCORN")?;
        write_wrapped(out, &self.zcorn, VALUES_PER_LINE, |v| format!("{:.4}", v))?;
        writeln!(out, " /")?;
        writeln!(out)?;
        writeln!(out, "ACTNUM")?;
        write_wrapped(out, &self.actnum, 20, |a| (if *a { "1" } else { "0" }).to_string())?;
        writeln!(out, " /")?;
        Ok(())
    }
}

/// Per-cell values defined on a named grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridProperty {
    name: Option<String>,
    geometry: Option<String>,
    ncol: u32,
    nrow: u32,
    nlay: u32,
    values: Vec<f64>,
    discrete: bool,
}

impl GridProperty {
    pub fn new(dimensions: (u32, u32, u32), values: Vec<f64>) -> DataioResult<Self> {
        let (ncol, nrow, nlay) = dimensions;
        check_dimensions(ncol, nrow, nlay)?;
        let cells = cell_count(ncol, nrow, nlay);
        if values.len() != cells {
            return Err(DataioError::invalid_input(format!(
                "grid property has {} values, expected {}",
                values.len(),
                cells
            )));
        }
        Ok(Self {
            name: None,
            geometry: None,
            ncol,
            nrow,
            nlay,
            values,
            discrete: false,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name of the grid the property belongs to
    pub fn with_geometry(mut self, grid_name: impl Into<String>) -> Self {
        self.geometry = Some(grid_name.into());
        self
    }

    /// Integer codes such as zones or regions
    pub fn discrete(mut self) -> Self {
        self.discrete = true;
        self
    }

    fn keyword(&self) -> String {
        self.name
            .as_deref()
            .unwrap_or("PROPERTY")
            .to_ascii_uppercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .take(8)
            .collect()
    }
}

impl DataObject for GridProperty {
    fn class(&self) -> MetadataClass {
        MetadataClass::CpgridProperty
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn default_folder(&self) -> &'static str {
        "grids"
    }

    fn extension(&self) -> &'static str {
        ".grdecl"
    }

    fn format(&self) -> FileFormat {
        FileFormat::Grdecl
    }

    fn layout(&self) -> Layout {
        Layout::Cornerpoint
    }

    fn spec(&self) -> Option<Specification> {
        Some(Specification::CpGrid(CpGridSpec {
            ncol: self.ncol,
            nrow: self.nrow,
            nlay: self.nlay,
        }))
    }

    fn bbox(&self) -> Option<BoundingBox> {
        None
    }

    fn geometry_name(&self) -> Option<&str> {
        self.geometry.as_deref()
    }

    fn write_payload(&self, out: &mut Vec<u8>) -> DataioResult<()> {
        writeln!(out, "{}", self.keyword())?;
        if self.discrete {
            write_wrapped(out, &self.values, VALUES_PER_LINE, |v| format!("{}", v.round() as i64))?;
        } else {
            write_wrapped(out, &self.values, VALUES_PER_LINE, |v| format!("{:.6}", v))?;
        }
        writeln!(out, " /")?;
        Ok(())
    }
}
