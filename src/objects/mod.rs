//! Exportable data objects
//!
//! Each object knows its class, payload format and geometry, and encodes
//! its own payload bytes. The exporter never inspects payloads beyond
//! what this trait exposes.

mod dictionary;
mod grid;
mod polygons;
mod surface;
mod table;

pub use dictionary::Dictionary;
pub use grid::{CornerPointGrid, GridProperty};
pub use polygons::{PolygonPoint, Polygons};
pub use surface::{RegularSurface, IRAP_UNDEF};
pub use table::{Column, ColumnValues, Table};

use serde_json::Value;

use crate::error::DataioResult;
use crate::metadata::{BoundingBox, FileFormat, Layout, MetadataClass, Specification};

/// An object that can be exported with FMU metadata
pub trait DataObject {
    fn class(&self) -> MetadataClass;

    /// Name carried by the object itself, used when no name is given
    fn name(&self) -> Option<&str>;

    /// Folder under `share/<results|observations|preprocessed>/`
    fn default_folder(&self) -> &'static str;

    /// File extension including the dot
    fn extension(&self) -> &'static str;

    fn format(&self) -> FileFormat;

    fn layout(&self) -> Layout;

    fn spec(&self) -> Option<Specification>;

    fn bbox(&self) -> Option<BoundingBox>;

    fn table_index(&self) -> Option<Vec<String>> {
        None
    }

    /// Name of the geometry this object is defined on, used as the
    /// filename parent when none is given
    fn geometry_name(&self) -> Option<&str> {
        None
    }

    /// Payload rows as JSON, for validation against a file-format schema
    fn payload_rows(&self) -> Option<Value> {
        None
    }

    /// Appends the encoded payload to `out`
    fn write_payload(&self, out: &mut Vec<u8>) -> DataioResult<()>;

    /// The encoded payload
    fn to_payload(&self) -> DataioResult<Vec<u8>> {
        let mut out = Vec::new();
        self.write_payload(&mut out)?;
        Ok(out)
    }
}

/// Writes `values` `per_line` to a line, each line indented by one space
pub(crate) fn write_wrapped<W, T, F>(
    out: &mut W,
    values: &[T],
    per_line: usize,
    fmt: F,
) -> std::io::Result<()>
where
    W: std::io::Write,
    F: Fn(&T) -> String,
{
    for chunk in values.chunks(per_line.max(1)) {
        let line: Vec<String> = chunk.iter().map(&fmt).collect();
        writeln!(out, " {}", line.join(" "))?;
    }
    Ok(())
}
