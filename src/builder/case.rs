//! Case metadata
//!
//! Written once per case to `<caseroot>/share/metadata/fmu_case.yml`,
//! before any realization runs. Every later export reads its case block
//! from that file.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::{access_block, new_document};
use crate::config::GlobalConfiguration;
use crate::context::CASE_METADATA_RELATIVE_PATH;
use crate::error::{DataioError, DataioResult};
use crate::metadata::{Case, Context, ContextStage, Fmu, MetadataClass, MetadataDocument, User};

#[derive(Debug, Clone)]
pub struct CaseMetadataBuilder<'a> {
    config: &'a GlobalConfiguration,
    caseroot: PathBuf,
    casename: String,
    user: String,
    description: Option<Vec<String>>,
}

impl<'a> CaseMetadataBuilder<'a> {
    /// # Errors
    ///
    /// `InvalidInput` for a relative case root or an empty case name
    pub fn new(
        config: &'a GlobalConfiguration,
        caseroot: impl Into<PathBuf>,
        casename: impl Into<String>,
        user: impl Into<String>,
    ) -> DataioResult<Self> {
        let caseroot = caseroot.into();
        if !caseroot.is_absolute() {
            return Err(DataioError::invalid_input(format!(
                "caseroot '{}' must be an absolute path",
                caseroot.display()
            )));
        }
        let casename = casename.into();
        if casename.trim().is_empty() {
            return Err(DataioError::invalid_input("casename must not be empty"));
        }
        Ok(Self {
            config,
            caseroot,
            casename,
            user: user.into(),
            description: None,
        })
    }

    pub fn with_description(mut self, description: Vec<String>) -> Self {
        self.description = Some(description).filter(|d| !d.is_empty());
        self
    }

    pub fn caseroot(&self) -> &Path {
        &self.caseroot
    }

    /// Location of the case file, relative to the case root
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(CASE_METADATA_RELATIVE_PATH)
    }

    /// Builds a `case` document with a fresh case uuid
    pub fn build(&self) -> MetadataDocument {
        let case = Case {
            name: self.casename.clone(),
            uuid: Uuid::new_v4(),
            user: User::new(&self.user),
            description: self.description.clone(),
        };
        let fmu = Fmu {
            model: self.config.model.clone(),
            case,
            context: Context {
                stage: ContextStage::Case,
            },
            ensemble: None,
            iteration: None,
            realization: None,
            aggregation: None,
            workflow: None,
            entity: None,
            ert: None,
        };
        new_document(
            MetadataClass::Case,
            fmu,
            access_block(self.config, None, None),
            self.config.masterdata.clone(),
            &self.user,
        )
    }
}
