//! Case and Aggregation Tests
//!
//! - Case metadata is written once and never overwritten
//! - Realization exports pick the case up from disk
//! - Aggregations combine realizations of one ensemble

mod common;

use std::path::PathBuf;

use fmu_dataio::builder::{AggregationBuilder, CaseMetadataBuilder, ExportSettings, MetadataBuilder};
use fmu_dataio::context::{ids, RunContext};
use fmu_dataio::export::{Exporter, LocalBackend, MemoryBackend};
use fmu_dataio::metadata::{Content, ContextStage, MetadataDocument};
use fmu_dataio::objects::DataObject;
use fmu_dataio::schema::SchemaValidator;
use fmu_dataio::DataioError;
use tempfile::TempDir;

fn realization_documents(realizations: &[u32]) -> Vec<MetadataDocument> {
    let config = common::config();
    let case = common::case();
    realizations
        .iter()
        .map(|&id| {
            let ctx = common::realization_context(&case, id);
            let builder = MetadataBuilder::new(
                &config,
                &ctx,
                ExportSettings::new(Content::Depth).with_name("TopVolantis"),
            )
            .unwrap();
            let object = common::surface("TopVolantis");
            builder.build(&object, &object.to_payload().unwrap()).unwrap()
        })
        .collect()
}

// =============================================================================
// Case metadata
// =============================================================================

#[test]
fn test_case_metadata_is_written_once() {
    let config = common::config();
    let builder = CaseMetadataBuilder::new(&config, common::CASEPATH, "snakeoil", "tester").unwrap();
    let exporter = Exporter::new(MemoryBackend::new(), common::registry());

    let first = exporter.export_case(&builder).unwrap();
    assert!(first.created);
    assert_eq!(
        first.relative_path,
        PathBuf::from("share/metadata/fmu_case.yml")
    );

    let second = exporter.export_case(&builder).unwrap();
    assert!(!second.created);
    assert_eq!(second.document.fmu.case.uuid, first.document.fmu.case.uuid);
    assert_eq!(exporter.backend().len(), 1);
}

#[test]
fn test_realization_context_reads_case_from_disk() {
    let tmp = TempDir::new().unwrap();
    let config = common::config();
    let builder = CaseMetadataBuilder::new(&config, tmp.path(), "snakeoil", "tester").unwrap();
    let exporter = Exporter::new(LocalBackend::new(tmp.path()), common::registry());
    let case_uuid = exporter.export_case(&builder).unwrap().document.fmu.case.uuid;

    let loaded = RunContext::load_case(tmp.path()).unwrap();
    assert_eq!(loaded.case().unwrap().uuid, case_uuid);

    let runpath = tmp.path().join("realization-5").join("iter-1");
    let ctx = RunContext::from_lookup(
        |key| match key {
            "_ERT_RUNPATH" => Some(runpath.display().to_string()),
            "_ERT_REALIZATION_NUMBER" => Some("5".into()),
            "_ERT_ITERATION_NUMBER" => Some("1".into()),
            _ => None,
        },
        None,
    )
    .unwrap();
    assert_eq!(ctx.case().unwrap().uuid, case_uuid);
    assert_eq!(ctx.realization().unwrap().id, 5);

    let ensemble = ctx.ensemble().unwrap();
    assert_eq!(ensemble.uuid, ids::ensemble_uuid(&case_uuid, "iter-1"));
}

#[test]
fn test_missing_case_metadata_is_context_error() {
    let tmp = TempDir::new().unwrap();
    let err = RunContext::load_case(tmp.path()).unwrap_err();
    assert!(matches!(err, DataioError::Context(_)));
}

// =============================================================================
// Aggregation
// =============================================================================

#[test]
fn test_aggregation_document_validates() {
    let sources = realization_documents(&[0, 1, 2]);
    let mean = common::surface("TopVolantis");
    let payload = mean.to_payload().unwrap();

    let doc = AggregationBuilder::new("mean")
        .unwrap()
        .build(&sources, &mean, &payload)
        .unwrap();

    assert_eq!(doc.stage(), ContextStage::Ensemble);
    assert!(doc.fmu.realization.is_none());
    let aggregation = doc.fmu.aggregation.as_ref().unwrap();
    assert_eq!(aggregation.operation, "mean");
    assert_eq!(aggregation.realization_ids, vec![0, 1, 2]);

    let file = doc.file.as_ref().unwrap();
    assert_eq!(
        file.relative_path,
        "iter-0/share/results/maps/topvolantis--mean.gri"
    );
    assert!(file.runpath_relative_path.is_none());
    assert_eq!(
        file.absolute_path.as_deref(),
        Some("/scratch/drogon/snakeoil/iter-0/share/results/maps/topvolantis--mean.gri")
    );

    let registry = common::registry();
    let report = SchemaValidator::new(&registry)
        .validate_document(&doc)
        .unwrap();
    assert!(report.is_valid(), "{}", report);
}

#[test]
fn test_aggregation_id_depends_only_on_realizations() {
    let sources = realization_documents(&[3, 4]);
    let object = common::surface("TopVolantis");
    let payload = object.to_payload().unwrap();

    let mean = AggregationBuilder::new("mean").unwrap();
    let p10 = AggregationBuilder::new("p10").unwrap();
    let a = mean.build(&sources, &object, &payload).unwrap();
    let b = p10.build(&sources, &object, &payload).unwrap();
    assert_eq!(
        a.fmu.aggregation.unwrap().id,
        b.fmu.aggregation.unwrap().id
    );
}

#[test]
fn test_sources_from_different_cases_are_rejected() {
    let mut sources = realization_documents(&[0]);
    sources.extend(realization_documents(&[1]));
    let object = common::surface("TopVolantis");

    let err = AggregationBuilder::new("mean")
        .unwrap()
        .build(&sources, &object, &object.to_payload().unwrap())
        .unwrap_err();
    assert!(matches!(err, DataioError::Context(_)));
}

#[test]
fn test_export_aggregation_writes_to_ensemble_folder() {
    let sources = realization_documents(&[0, 1]);
    let object = common::surface("TopVolantis");
    let exporter = Exporter::new(MemoryBackend::new(), common::registry());

    let builder = AggregationBuilder::new("std")
        .unwrap()
        .with_tagname("ds");
    let receipt = exporter
        .export_aggregation(&object, &builder, &sources)
        .unwrap();

    assert_eq!(
        receipt.relative_path,
        PathBuf::from("iter-0/share/results/maps/topvolantis--std--ds.gri")
    );
    assert_eq!(exporter.backend().len(), 2);
    let read_back = exporter.read_metadata(&receipt.relative_path).unwrap();
    assert_eq!(read_back.fmu.aggregation, receipt.document.fmu.aggregation);
}
