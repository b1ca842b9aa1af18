//! Aggregated metadata
//!
//! Combines the documents of one object from many realizations into the
//! document of a derived object (mean, p10, ...). The first source serves
//! as template; `file`, `tracklog` and parts of `data` are replaced.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::current_user;
use super::filename::to_slash;
use crate::checksum::md5_hex;
use crate::context::ids;
use crate::error::{DataioError, DataioResult};
use crate::metadata::{Aggregation, ContextStage, File, MetadataDocument, Tracklog};
use crate::objects::DataObject;
use crate::observability::{log_event, Event};

#[derive(Debug, Clone, Default)]
pub struct AggregationBuilder {
    operation: String,
    name: Option<String>,
    tagname: Option<String>,
    aggregation_id: Option<Uuid>,
    casepath: Option<PathBuf>,
}

impl AggregationBuilder {
    /// # Errors
    ///
    /// `InvalidInput` for an empty operation
    pub fn new(operation: impl Into<String>) -> DataioResult<Self> {
        let operation = operation.into();
        if operation.trim().is_empty() {
            return Err(DataioError::invalid_input("aggregation operation must not be empty"));
        }
        Ok(Self {
            operation,
            ..Self::default()
        })
    }

    /// Replaces the file stem and `data.name`
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into()).filter(|n: &String| !n.is_empty());
        self
    }

    pub fn with_tagname(mut self, tagname: impl Into<String>) -> Self {
        self.tagname = Some(tagname.into()).filter(|t: &String| !t.is_empty());
        self
    }

    /// Uses `id` instead of the id derived from the realization uuids
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.aggregation_id = Some(id);
        self
    }

    /// Case root used for `absolute_path`
    pub fn with_casepath(mut self, casepath: impl Into<PathBuf>) -> Self {
        self.casepath = Some(casepath.into());
        self
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Builds the aggregated document for `object`, encoded as `payload`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` without sources or when the first source has no
    ///   `file` block
    /// - `Context` when sources disagree on case or ensemble, or lack a
    ///   realization
    pub fn build(
        &self,
        sources: &[MetadataDocument],
        object: &dyn DataObject,
        payload: &[u8],
    ) -> DataioResult<MetadataDocument> {
        let template = sources
            .first()
            .ok_or_else(|| DataioError::invalid_input("no source metadata to aggregate"))?;
        let (realization_ids, realization_uuids) = check_sources(sources)?;

        let source_file = template
            .file
            .as_ref()
            .ok_or_else(|| DataioError::invalid_input("source metadata has no file block"))?;
        let realization_name = template
            .fmu
            .realization
            .as_ref()
            .map(|r| r.name.clone())
            .unwrap_or_default();
        let (relative, absolute) = self.aggregated_paths(source_file, &realization_name)?;

        let id = self
            .aggregation_id
            .unwrap_or_else(|| ids::aggregation_id(&realization_uuids));

        let mut document = template.clone();
        document.tracklog = Tracklog::initialize(&current_user());
        document.fmu.realization = None;
        document.fmu.context.stage = ContextStage::Ensemble;
        document.fmu.aggregation = Some(Aggregation {
            id,
            operation: self.operation.clone(),
            realization_ids,
        });
        document.file = Some(File {
            relative_path: to_slash(&relative),
            absolute_path: absolute.map(|p| p.display().to_string()),
            runpath_relative_path: None,
            checksum_md5: md5_hex(payload),
            size_bytes: Some(payload.len() as u64),
        });

        if let Some(data) = document.data.as_mut() {
            if let Some(name) = &self.name {
                data.name = name.clone();
            }
            if let Some(tagname) = &self.tagname {
                data.tagname = Some(tagname.clone());
            }
            if let Some(bbox) = object.bbox() {
                data.bbox = Some(bbox);
            }
            if let Some(spec) = object.spec() {
                data.spec = Some(spec);
            }
        }

        log_event(
            Event::AggregationBuilt,
            &[
                ("aggregation_id", &id.to_string()),
                ("operation", &self.operation),
                ("realizations", &sources.len().to_string()),
            ],
        );
        Ok(document)
    }

    /// `realization-N/<ens>/share/.../x.gri` becomes
    /// `<ens>/share/.../<stem>.gri`
    fn aggregated_paths(
        &self,
        source: &File,
        realization_name: &str,
    ) -> DataioResult<(PathBuf, Option<PathBuf>)> {
        let source_relative = Path::new(&source.relative_path);
        let stripped = source_relative
            .strip_prefix(realization_name)
            .unwrap_or(source_relative);

        let extension = stripped
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        let source_stem = stripped
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                DataioError::invalid_input(format!(
                    "source relative_path '{}' has no file name",
                    source.relative_path
                ))
            })?;

        let mut stem = match &self.name {
            Some(name) => name.clone(),
            None => format!("{}--{}", source_stem, self.operation),
        };
        if let Some(tagname) = &self.tagname {
            stem = format!("{}--{}", stem, tagname);
        }
        let file_name = format!("{}{}", stem, extension);
        let relative = match stripped.parent() {
            Some(parent) => parent.join(&file_name),
            None => PathBuf::from(&file_name),
        };

        let absolute = match (&self.casepath, &source.absolute_path) {
            (Some(casepath), _) => Some(casepath.join(&relative)),
            (None, Some(abs)) => Path::new(abs)
                .parent()
                .map(|dir| strip_component(&dir.join(&file_name), realization_name)),
            (None, None) => None,
        };
        Ok((relative, absolute))
    }
}

/// Removes the first path component equal to `component`
fn strip_component(path: &Path, component: &str) -> PathBuf {
    let mut removed = false;
    path.components()
        .filter(|c| {
            if !removed && c.as_os_str() == component {
                removed = true;
                return false;
            }
            true
        })
        .collect()
}

/// Checks all sources belong to one case and ensemble; returns the
/// realization ids and uuids.
fn check_sources(sources: &[MetadataDocument]) -> DataioResult<(Vec<u32>, Vec<Uuid>)> {
    let first = &sources[0];
    let case_uuid = first.fmu.case.uuid;
    let ensemble_uuid = first.fmu.ensemble_block().map(|e| e.uuid);

    let mut ids = Vec::with_capacity(sources.len());
    let mut uuids = Vec::with_capacity(sources.len());
    for (index, source) in sources.iter().enumerate() {
        if source.fmu.case.uuid != case_uuid {
            return Err(DataioError::context(format!(
                "source {} belongs to case {}, expected {}",
                index, source.fmu.case.uuid, case_uuid
            )));
        }
        if source.fmu.ensemble_block().map(|e| e.uuid) != ensemble_uuid || ensemble_uuid.is_none()
        {
            return Err(DataioError::context(format!(
                "source {} is not from the same ensemble as the first source",
                index
            )));
        }
        let realization = source.fmu.realization.as_ref().ok_or_else(|| {
            DataioError::context(format!("source {} has no realization block", index))
        })?;
        ids.push(realization.id);
        uuids.push(realization.uuid);
    }
    Ok((ids, uuids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        Access, Asset, Case, Content, Context, Data, Ensemble, FileFormat, Fmu, Layout,
        Masterdata, MetadataClass, Model, Realization, Smda, SmdaItem, User,
    };
    use crate::objects::RegularSurface;

    fn smda_item() -> SmdaItem {
        SmdaItem {
            identifier: "X".into(),
            uuid: Uuid::nil(),
        }
    }

    fn source(case: &Case, ensemble: &Ensemble, id: u32) -> MetadataDocument {
        let realization = Realization {
            id,
            name: format!("realization-{}", id),
            uuid: ids::realization_uuid(&case.uuid, &ensemble.uuid, id),
            is_reference: None,
        };
        let relative = format!("realization-{}/iter-0/share/results/maps/topvolantis.gri", id);
        let mut fmu = Fmu {
            model: Model {
                name: "ff".into(),
                revision: "1".into(),
                description: None,
            },
            case: case.clone(),
            context: Context {
                stage: ContextStage::Realization,
            },
            ensemble: None,
            iteration: None,
            realization: Some(realization),
            aggregation: None,
            workflow: None,
            entity: None,
            ert: None,
        };
        fmu.set_ensemble(Some(ensemble.clone()));

        MetadataDocument {
            schema: String::new(),
            version: "0.10.0".into(),
            source: "fmu".into(),
            tracklog: Tracklog::initialize("tester"),
            class: MetadataClass::Surface,
            fmu,
            file: Some(File {
                absolute_path: Some(format!("/scratch/field/snakeoil/{}", relative)),
                relative_path: relative,
                runpath_relative_path: Some("share/results/maps/topvolantis.gri".into()),
                checksum_md5: "0".repeat(32),
                size_bytes: Some(1),
            }),
            data: Some(Data {
                name: "TopVolantis".into(),
                stratigraphic: false,
                offset: 0.0,
                alias: None,
                stratigraphic_alias: None,
                top: None,
                base: None,
                content: Content::Depth,
                tagname: None,
                format: FileFormat::IrapAscii,
                layout: Layout::Regular,
                unit: String::new(),
                vertical_domain: None,
                domain_reference: None,
                spec: None,
                bbox: None,
                time: None,
                table_index: None,
                undef_is_zero: false,
                is_prediction: true,
                is_observation: false,
                description: None,
                field_outline: None,
                fluid_contact: None,
                field_region: None,
                seismic: None,
            }),
            display: None,
            access: Access {
                asset: Asset {
                    name: "Drogon".into(),
                },
                classification: None,
                ssdl: None,
            },
            masterdata: Masterdata {
                smda: Smda {
                    coordinate_system: smda_item(),
                    country: vec![],
                    discovery: vec![],
                    field: vec![],
                    stratigraphic_column: smda_item(),
                },
            },
            standard_result: None,
            preprocessed: None,
        }
    }

    fn fixture() -> (Case, Ensemble) {
        let case = Case {
            name: "snakeoil".into(),
            uuid: Uuid::new_v4(),
            user: User::new("tester"),
            description: None,
        };
        let ensemble = Ensemble {
            id: 0,
            name: "iter-0".into(),
            uuid: ids::ensemble_uuid(&case.uuid, "iter-0"),
            restart_from: None,
        };
        (case, ensemble)
    }

    fn mean_surface() -> RegularSurface {
        RegularSurface::new(2, 1, (0.0, 0.0), (10.0, 10.0), vec![Some(1.0), Some(2.0)]).unwrap()
    }

    #[test]
    fn test_aggregated_document() {
        let (case, ensemble) = fixture();
        let sources: Vec<_> = [3, 1, 2].iter().map(|&i| source(&case, &ensemble, i)).collect();
        let object = mean_surface();
        let doc = AggregationBuilder::new("mean")
            .unwrap()
            .build(&sources, &object, b"payload")
            .unwrap();

        assert_eq!(doc.stage(), ContextStage::Ensemble);
        assert!(doc.fmu.realization.is_none());
        let aggregation = doc.fmu.aggregation.as_ref().unwrap();
        assert_eq!(aggregation.realization_ids, vec![3, 1, 2]);
        assert_eq!(aggregation.operation, "mean");

        let file = doc.file.as_ref().unwrap();
        assert_eq!(
            file.relative_path,
            "iter-0/share/results/maps/topvolantis--mean.gri"
        );
        assert_eq!(
            file.absolute_path.as_deref(),
            Some("/scratch/field/snakeoil/iter-0/share/results/maps/topvolantis--mean.gri")
        );
        assert_eq!(file.checksum_md5, md5_hex(b"payload"));
        assert!(doc.data.unwrap().bbox.is_some());
    }

    #[test]
    fn test_id_independent_of_order() {
        let (case, ensemble) = fixture();
        let forward: Vec<_> = [0, 1].iter().map(|&i| source(&case, &ensemble, i)).collect();
        let backward: Vec<_> = [1, 0].iter().map(|&i| source(&case, &ensemble, i)).collect();
        let builder = AggregationBuilder::new("p10").unwrap();
        let a = builder.build(&forward, &mean_surface(), b"x").unwrap();
        let b = builder.build(&backward, &mean_surface(), b"x").unwrap();
        assert_eq!(a.fmu.aggregation.unwrap().id, b.fmu.aggregation.unwrap().id);
    }

    #[test]
    fn test_name_tagname_and_casepath() {
        let (case, ensemble) = fixture();
        let sources = vec![source(&case, &ensemble, 0)];
        let fixed = Uuid::new_v4();
        let doc = AggregationBuilder::new("mean")
            .unwrap()
            .with_name("myname")
            .with_tagname("mytag")
            .with_id(fixed)
            .with_casepath("/other/case")
            .build(&sources, &mean_surface(), b"x")
            .unwrap();
        let file = doc.file.unwrap();
        assert_eq!(file.relative_path, "iter-0/share/results/maps/myname--mytag.gri");
        assert_eq!(
            file.absolute_path.as_deref(),
            Some("/other/case/iter-0/share/results/maps/myname--mytag.gri")
        );
        assert_eq!(doc.fmu.aggregation.unwrap().id, fixed);
        assert_eq!(doc.data.unwrap().name, "myname");
    }

    #[test]
    fn test_mixed_cases_rejected() {
        let (case, ensemble) = fixture();
        let (other_case, other_ensemble) = fixture();
        let sources = vec![
            source(&case, &ensemble, 0),
            source(&other_case, &other_ensemble, 1),
        ];
        let err = AggregationBuilder::new("mean")
            .unwrap()
            .build(&sources, &mean_surface(), b"x")
            .unwrap_err();
        assert!(matches!(err, DataioError::Context(_)));
    }

    #[test]
    fn test_source_without_realization_rejected() {
        let (case, ensemble) = fixture();
        let mut lone = source(&case, &ensemble, 0);
        lone.fmu.realization = None;
        let err = AggregationBuilder::new("mean")
            .unwrap()
            .build(&[lone], &mean_surface(), b"x")
            .unwrap_err();
        assert!(matches!(err, DataioError::Context(_)));
    }

    #[test]
    fn test_empty_operation_rejected() {
        assert!(matches!(
            AggregationBuilder::new(" "),
            Err(DataioError::InvalidInput(_))
        ));
    }
}
