//! Ensemble and realization records
//!
//! Context-class documents describing the run itself. They carry no
//! `file` and no `data`.

use super::{access_block, current_user, new_document};
use crate::config::GlobalConfiguration;
use crate::context::RunContext;
use crate::error::{DataioError, DataioResult};
use crate::metadata::{Context, ContextStage, Fmu, MetadataClass, MetadataDocument};

#[derive(Debug, Clone, Copy)]
pub struct RunRecordBuilder<'a> {
    config: &'a GlobalConfiguration,
    context: &'a RunContext,
}

impl<'a> RunRecordBuilder<'a> {
    pub fn new(config: &'a GlobalConfiguration, context: &'a RunContext) -> Self {
        Self { config, context }
    }

    /// `ensemble` document for the ensemble of the current run
    pub fn ensemble(&self) -> DataioResult<MetadataDocument> {
        let mut fmu = self.base_fmu(ContextStage::Ensemble)?;
        fmu.realization = None;
        Ok(self.document(MetadataClass::Ensemble, fmu))
    }

    /// `realization` document for the current realization
    pub fn realization(&self) -> DataioResult<MetadataDocument> {
        let mut fmu = self.base_fmu(ContextStage::Realization)?;
        fmu.realization = Some(
            self.context
                .realization()
                .cloned()
                .ok_or_else(|| DataioError::context("no realization in run context"))?,
        );
        Ok(self.document(MetadataClass::Realization, fmu))
    }

    fn base_fmu(&self, stage: ContextStage) -> DataioResult<Fmu> {
        let case = self
            .context
            .case()
            .cloned()
            .ok_or_else(|| DataioError::context("run records need a case"))?;
        let ensemble = self
            .context
            .ensemble()
            .cloned()
            .ok_or_else(|| DataioError::context("run records need an ensemble"))?;

        let mut fmu = Fmu {
            model: self.config.model.clone(),
            case,
            context: Context { stage },
            ensemble: None,
            iteration: None,
            realization: None,
            aggregation: None,
            workflow: None,
            entity: None,
            ert: self.context.ert().copied(),
        };
        fmu.set_ensemble(Some(ensemble));
        Ok(fmu)
    }

    fn document(&self, class: MetadataClass, fmu: Fmu) -> MetadataDocument {
        new_document(
            class,
            fmu,
            access_block(self.config, None, None),
            self.config.masterdata.clone(),
            &current_user(),
        )
    }
}
