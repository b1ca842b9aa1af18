//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use fmu_dataio::config::GlobalConfiguration;
use fmu_dataio::context::{ids, RunContext};
use fmu_dataio::metadata::{Case, Ensemble, User};
use fmu_dataio::objects::{Column, ColumnValues, PolygonPoint, Polygons, RegularSurface, Table};
use fmu_dataio::schema::SchemaRegistry;
use uuid::Uuid;

pub const CASEPATH: &str = "/scratch/drogon/snakeoil";

pub fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

pub fn config() -> GlobalConfiguration {
    GlobalConfiguration::load(&data_path("global_variables.yml")).unwrap()
}

pub fn registry() -> Arc<SchemaRegistry> {
    Arc::new(SchemaRegistry::with_published().unwrap())
}

pub fn case() -> Case {
    Case {
        name: "snakeoil".into(),
        uuid: Uuid::new_v4(),
        user: User::new("tester"),
        description: Some(vec!["integration test case".into()]),
    }
}

pub fn ensemble(case: &Case, name: &str) -> Ensemble {
    Ensemble {
        id: 0,
        name: name.into(),
        uuid: ids::ensemble_uuid(&case.uuid, name),
        restart_from: None,
    }
}

pub fn case_context() -> RunContext {
    RunContext::for_case(CASEPATH, case())
}

pub fn realization_context(case: &Case, realization: u32) -> RunContext {
    RunContext::for_realization(CASEPATH, case.clone(), ensemble(case, "iter-0"), realization)
}

pub fn surface(name: &str) -> RegularSurface {
    let values = (0..12).map(|v| Some(1650.0 + f64::from(v))).collect();
    RegularSurface::new(4, 3, (461_500.0, 5_926_500.0), (25.0, 25.0), values)
        .unwrap()
        .with_name(name)
}

pub fn volumes() -> Table {
    Table::new(vec![
        Column::new(
            "ZONE",
            ColumnValues::Text(vec!["Valysar".into(), "Therys".into()]),
        ),
        Column::new("STOIIP_OIL", ColumnValues::Float(vec![1.2e6, 3.4e6])),
    ])
    .unwrap()
    .with_name("geogrid")
}

/// Rows shaped like the inplace volumes standard result
pub fn inplace_volumes() -> Table {
    let text = |v: &[&str]| ColumnValues::Text(v.iter().map(|s| s.to_string()).collect());
    Table::new(vec![
        Column::new("FLUID", text(&["oil", "gas"])),
        Column::new("ZONE", text(&["Valysar", "Valysar"])),
        Column::new("REGION", text(&["WestLowland", "WestLowland"])),
        Column::new("BULK", ColumnValues::Float(vec![3.1e8, 2.2e8])),
        Column::new("NET", ColumnValues::Float(vec![2.4e8, 1.7e8])),
        Column::new("PORV", ColumnValues::Float(vec![6.0e7, 4.1e7])),
        Column::new("STOIIP", ColumnValues::Float(vec![4.2e7, 0.0])),
    ])
    .unwrap()
    .with_name("geogrid")
}

pub fn outline() -> Polygons {
    let square = [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0), (0.0, 0.0)];
    let points = square
        .iter()
        .map(|&(x, y)| PolygonPoint {
            x,
            y,
            z: 1700.0,
            poly_id: 0,
        })
        .collect();
    Polygons::new(points).unwrap().with_name("field_outline")
}
