//! Column-oriented tables, written as CSV

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::DataObject;
use crate::error::{DataioError, DataioResult};
use crate::metadata::{
    BoundingBox, FileFormat, Layout, MetadataClass, Specification, TableSpec,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Text(Vec<String>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Int(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn json_cell(&self, row: usize) -> Value {
        match self {
            ColumnValues::Float(v) => Value::from(v[row]),
            ColumnValues::Int(v) => Value::from(v[row]),
            ColumnValues::Text(v) => Value::String(v[row].clone()),
        }
    }

    fn cell(&self, row: usize) -> String {
        match self {
            ColumnValues::Float(v) => v[row].to_string(),
            ColumnValues::Int(v) => v[row].to_string(),
            ColumnValues::Text(v) => v[row].clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn new(name: impl Into<String>, values: ColumnValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: Option<String>,
    columns: Vec<Column>,
    index: Option<Vec<String>>,
}

impl Table {
    /// Columns must have unique, non-empty names and equal lengths.
    pub fn new(columns: Vec<Column>) -> DataioResult<Self> {
        let mut seen = BTreeSet::new();
        for column in &columns {
            if column.name.is_empty() {
                return Err(DataioError::invalid_input("table column without a name"));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(DataioError::invalid_input(format!(
                    "duplicate table column '{}'",
                    column.name
                )));
            }
        }
        if let Some(first) = columns.first() {
            let rows = first.values.len();
            if let Some(bad) = columns.iter().find(|c| c.values.len() != rows) {
                return Err(DataioError::invalid_input(format!(
                    "column '{}' has {} rows, expected {}",
                    bad.name,
                    bad.values.len(),
                    rows
                )));
            }
        }
        Ok(Self {
            name: None,
            columns,
            index: None,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declares index columns; each must exist in the table.
    pub fn with_index(mut self, index: Vec<String>) -> DataioResult<Self> {
        self.check_index(&index)?;
        self.index = Some(index);
        Ok(self)
    }

    pub fn check_index(&self, index: &[String]) -> DataioResult<()> {
        match index.iter().find(|name| !self.columns.iter().any(|c| &c.name == *name)) {
            Some(missing) => Err(DataioError::invalid_input(format!(
                "table index column '{}' is not in the table",
                missing
            ))),
            None => Ok(()),
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }
}

impl DataObject for Table {
    fn class(&self) -> MetadataClass {
        MetadataClass::Table
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn default_folder(&self) -> &'static str {
        "tables"
    }

    fn extension(&self) -> &'static str {
        ".csv"
    }

    fn format(&self) -> FileFormat {
        FileFormat::Csv
    }

    fn layout(&self) -> Layout {
        Layout::Table
    }

    fn spec(&self) -> Option<Specification> {
        let num_columns = self.columns.len() as u64;
        let num_rows = self.num_rows() as u64;
        Some(Specification::Table(TableSpec {
            columns: self.column_names(),
            num_columns,
            num_rows,
            size: num_columns * num_rows,
        }))
    }

    fn bbox(&self) -> Option<BoundingBox> {
        None
    }

    fn table_index(&self) -> Option<Vec<String>> {
        self.index.clone()
    }

    /// One JSON object per row, keyed by column name
    fn payload_rows(&self) -> Option<Value> {
        let rows = (0..self.num_rows())
            .map(|row| {
                let record: Map<String, Value> = self
                    .columns
                    .iter()
                    .map(|c| (c.name.clone(), c.values.json_cell(row)))
                    .collect();
                Value::Object(record)
            })
            .collect();
        Some(Value::Array(rows))
    }

    fn write_payload(&self, out: &mut Vec<u8>) -> DataioResult<()> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(self.columns.iter().map(|c| c.name.as_str()))?;
        for row in 0..self.num_rows() {
            writer.write_record(self.columns.iter().map(|c| c.values.cell(row)))?;
        }
        writer.flush()?;
        Ok(())
    }
}
