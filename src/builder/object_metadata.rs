//! Metadata for a single data object

use std::path::{Path, PathBuf};

use super::filename::{file_stem, share_folder, to_slash};
use super::settings::{ContentMetadata, ExportSettings};
use super::{access_block, current_user, new_document};
use crate::checksum::md5_hex;
use crate::config::GlobalConfiguration;
use crate::context::{ids, FmuContext, RunContext};
use crate::error::{DataioError, DataioResult};
use crate::metadata::{
    Case, Context, ContextStage, Data, Display, Entity, File, FileSchema, Fmu, Layer,
    MetadataDocument, StandardResult, Workflow,
};
use crate::objects::DataObject;
use crate::observability::{log_event, Event};
use crate::schema::standard_result_key;

/// Where an object is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPath {
    /// Relative to the case root
    pub relative: PathBuf,
    /// Relative to the runpath, in realization context
    pub runpath_relative: Option<PathBuf>,
    pub absolute: PathBuf,
}

/// Builds `surface`, `table`, `cpgrid`, ... documents.
///
/// Settings are checked once in [`MetadataBuilder::new`]; the builder can
/// then be reused for any number of objects.
#[derive(Debug, Clone)]
pub struct MetadataBuilder<'a> {
    config: &'a GlobalConfiguration,
    context: &'a RunContext,
    settings: ExportSettings,
}

impl<'a> MetadataBuilder<'a> {
    /// # Errors
    ///
    /// - `InvalidInput` for inconsistent settings
    /// - `Context` outside an FMU run, without a case, or for preprocessed
    ///   data in realization context
    pub fn new(
        config: &'a GlobalConfiguration,
        context: &'a RunContext,
        settings: ExportSettings,
    ) -> DataioResult<Self> {
        settings.validate()?;

        let fmu_context = context.fmu_context().ok_or_else(|| {
            DataioError::context("data objects can only be exported inside an FMU case or run")
        })?;
        if context.case().is_none() || context.casepath().is_none() {
            return Err(DataioError::context("run context has no case"));
        }
        if settings.preprocessed && fmu_context == FmuContext::Realization {
            return Err(DataioError::context(
                "preprocessed data cannot be exported in realization context",
            ));
        }

        Ok(Self {
            config,
            context,
            settings,
        })
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn context(&self) -> &RunContext {
        self.context
    }

    /// The name given in the settings, else the object's own
    fn given_name(&self, object: &dyn DataObject) -> DataioResult<String> {
        self.settings
            .name
            .clone()
            .or_else(|| object.name().map(str::to_string))
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| {
                DataioError::invalid_input("no name given and the object carries none")
            })
    }

    fn filename_parent<'o>(&'o self, object: &'o dyn DataObject) -> Option<&'o str> {
        match (object.geometry_name(), self.settings.parent.as_deref()) {
            (Some(geometry), Some(parent)) => {
                log_event(
                    Event::SettingIgnored,
                    &[
                        ("geometry", geometry),
                        ("parent", parent),
                        ("setting", "parent"),
                    ],
                );
                Some(geometry)
            }
            (geometry, parent) => geometry.or(parent),
        }
    }

    /// Computes the export location of `object`
    pub fn export_path(&self, object: &dyn DataObject) -> DataioResult<ExportPath> {
        let name = self.given_name(object)?;
        let time = self.settings.resolved_time()?;
        let stem = file_stem(
            self.filename_parent(object),
            &name,
            self.settings.tagname.as_deref(),
            time.t0_date(),
            time.t1_date(),
            self.settings.filename_timedata_reverse,
        )?;

        let folder = share_folder(
            self.settings.preprocessed,
            self.settings.is_observation,
            object.default_folder(),
            self.settings.forcefolder.as_deref(),
            self.settings.subfolder.as_deref(),
        )?;
        let share_path = folder.join(format!("{}{}", stem, object.extension()));

        let casepath = self
            .context
            .casepath()
            .ok_or_else(|| DataioError::context("run context has no case path"))?;

        let (relative, runpath_relative) = match self.context.realization_prefix() {
            Some(prefix) => (prefix.join(&share_path), Some(share_path)),
            None => (share_path, None),
        };
        let absolute = casepath.join(&relative);
        check_ascii(&absolute)?;

        Ok(ExportPath {
            relative,
            runpath_relative,
            absolute,
        })
    }

    /// Builds the document for `object` whose encoded bytes are `payload`
    pub fn build(&self, object: &dyn DataObject, payload: &[u8]) -> DataioResult<MetadataDocument> {
        let case = self
            .context
            .case()
            .ok_or_else(|| DataioError::context("run context has no case"))?;
        let path = self.export_path(object)?;

        let entity_key = to_slash(path.runpath_relative.as_ref().unwrap_or(&path.relative));
        let file = File {
            relative_path: to_slash(&path.relative),
            absolute_path: Some(path.absolute.display().to_string()),
            runpath_relative_path: path.runpath_relative.as_deref().map(to_slash),
            checksum_md5: md5_hex(payload),
            size_bytes: Some(payload.len() as u64),
        };

        let standard_result = self.standard_result_block(object)?;
        let data = self.data_block(object)?;
        let display = Display {
            name: Some(
                self.settings
                    .display_name
                    .clone()
                    .unwrap_or_else(|| data.name.clone()),
            ),
        };

        let mut fmu = self.fmu_block(case);
        fmu.entity = Some(Entity {
            uuid: ids::entity_uuid(&case.uuid, &entity_key),
        });

        let mut document = new_document(
            object.class(),
            fmu,
            access_block(
                self.config,
                self.settings.classification,
                self.settings.rep_include,
            ),
            self.config.masterdata.clone(),
            &current_user(),
        );
        document.file = Some(file);
        document.data = Some(data);
        document.display = Some(display);
        document.standard_result = standard_result;
        if self.settings.preprocessed {
            document.preprocessed = Some(true);
        }

        log_event(
            Event::MetadataBuilt,
            &[
                ("class", object.class().as_str()),
                ("relative_path", &to_slash(&path.relative)),
            ],
        );
        Ok(document)
    }

    fn standard_result_block(
        &self,
        object: &dyn DataObject,
    ) -> DataioResult<Option<StandardResult>> {
        let Some(name) = self.settings.standard_result else {
            return Ok(None);
        };
        if object.class() != name.class() {
            return Err(DataioError::invalid_input(format!(
                "standard result '{}' needs a {} object, got {}",
                name,
                name.class(),
                object.class()
            )));
        }
        let key = standard_result_key(name);
        Ok(Some(StandardResult {
            name,
            file_schema: Some(FileSchema {
                url: key.id_url(),
                version: key.version,
            }),
        }))
    }

    fn fmu_block(&self, case: &Case) -> Fmu {
        let mut fmu = Fmu {
            model: self.config.model.clone(),
            case: case.clone(),
            context: Context {
                stage: self.context.stage().unwrap_or(ContextStage::Case),
            },
            ensemble: None,
            iteration: None,
            realization: self.context.realization().cloned(),
            aggregation: None,
            workflow: self.settings.workflow.clone().map(|reference| Workflow { reference }),
            entity: None,
            ert: self.context.ert().copied(),
        };
        fmu.set_ensemble(self.context.ensemble().cloned());
        fmu
    }

    fn data_block(&self, object: &dyn DataObject) -> DataioResult<Data> {
        let settings = &self.settings;
        let given = self.given_name(object)?;
        let content = settings
            .content
            .ok_or_else(|| DataioError::invalid_input("content is required for data exports"))?;

        let mut data = Data {
            name: given.clone(),
            stratigraphic: false,
            offset: 0.0,
            alias: None,
            stratigraphic_alias: None,
            top: None,
            base: None,
            content,
            tagname: settings.tagname.clone().filter(|t| !t.is_empty()),
            format: object.format(),
            layout: object.layout(),
            unit: settings.unit.clone().unwrap_or_default(),
            vertical_domain: settings.effective_vertical_domain(),
            domain_reference: settings.effective_domain_reference(),
            spec: object.spec(),
            bbox: object.bbox(),
            time: settings.resolved_time()?.to_block(),
            table_index: settings.table_index.clone().or_else(|| object.table_index()),
            undef_is_zero: settings.undef_is_zero,
            is_prediction: settings.is_prediction,
            is_observation: settings.is_observation,
            description: settings.description.clone().filter(|d| !d.is_empty()),
            field_outline: None,
            fluid_contact: None,
            field_region: None,
            seismic: None,
        };

        if let Some(entry) = self.config.stratigraphy_entry(&given) {
            let mut alias = entry.aliases();
            if !alias.contains(&given) {
                alias.push(given.clone());
            }
            let strat_alias = entry.stratigraphic_aliases();

            data.name = entry.name.clone();
            data.stratigraphic = entry.stratigraphic;
            data.offset = entry.offset.unwrap_or(0.0);
            data.alias = Some(alias);
            data.stratigraphic_alias = (!strat_alias.is_empty()).then_some(strat_alias);
            if let (Some(top), Some(base)) = (entry.top.as_deref(), entry.base.as_deref()) {
                data.top = Some(self.layer(top));
                data.base = Some(self.layer(base));
            }
        }

        match &settings.content_metadata {
            Some(meta) if meta.content() == content => match meta.clone() {
                ContentMetadata::FieldOutline(block) => data.field_outline = Some(block),
                ContentMetadata::FluidContact(block) => data.fluid_contact = Some(block),
                ContentMetadata::FieldRegion(block) => data.field_region = Some(block),
                ContentMetadata::Seismic(block) => data.seismic = Some(block),
            },
            Some(meta) => log_event(
                Event::SettingIgnored,
                &[
                    ("content", content.as_str()),
                    ("content_metadata", meta.content().as_str()),
                    ("setting", "content_metadata"),
                ],
            ),
            None => {}
        }

        Ok(data)
    }

    /// Resolves a `top`/`base` reference through the stratigraphy block
    fn layer(&self, name: &str) -> Layer {
        match self.config.stratigraphy_entry(name) {
            Some(entry) => Layer {
                name: entry.name.clone(),
                stratigraphic: entry.stratigraphic,
                offset: entry.offset.unwrap_or(0.0),
            },
            None => Layer {
                name: name.to_string(),
                stratigraphic: false,
                offset: 0.0,
            },
        }
    }
}

fn check_ascii(path: &Path) -> DataioResult<()> {
    let rendered = path.display().to_string();
    if rendered.is_ascii() {
        Ok(())
    } else {
        Err(DataioError::invalid_input(format!(
            "path '{}' contains non-ASCII characters",
            rendered
        )))
    }
}
