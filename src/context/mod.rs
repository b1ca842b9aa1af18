//! Run context: where in an FMU run an export happens
//!
//! - Outside FMU: no case, nothing can be exported with FMU metadata
//! - Case context: exports land under `<casepath>/share/...`
//! - Realization context: exports land under
//!   `<casepath>/realization-N/<ensemble>/share/...`
//!
//! Inside an ERT run the context is detected from `_ERT_*` environment
//! variables and the case metadata written by `create-case`.

pub mod ids;

use std::fs;
use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use crate::error::{DataioError, DataioResult};
use crate::metadata::{
    Case, ContextStage, Ensemble, Ert, ErtExperiment, MetadataDocument, Realization,
    SimulationMode,
};

/// Case metadata location relative to the case root
pub const CASE_METADATA_RELATIVE_PATH: &str = "share/metadata/fmu_case.yml";

pub const ERT_RUNPATH: &str = "_ERT_RUNPATH";
pub const ERT_EXPERIMENT_ID: &str = "_ERT_EXPERIMENT_ID";
pub const ERT_ENSEMBLE_ID: &str = "_ERT_ENSEMBLE_ID";
pub const ERT_SIMULATION_MODE: &str = "_ERT_SIMULATION_MODE";
pub const ERT_REALIZATION_NUMBER: &str = "_ERT_REALIZATION_NUMBER";
pub const ERT_ITERATION_NUMBER: &str = "_ERT_ITERATION_NUMBER";

const REALIZATION_PREFIX: &str = "realization-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmuContext {
    Case,
    Realization,
}

/// Everything the builder needs to know about the current run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    fmu_context: Option<FmuContext>,
    casepath: Option<PathBuf>,
    case: Option<Case>,
    ensemble: Option<Ensemble>,
    realization: Option<Realization>,
    ert: Option<Ert>,
}

impl RunContext {
    /// No FMU context
    pub fn outside_fmu() -> Self {
        Self {
            fmu_context: None,
            casepath: None,
            case: None,
            ensemble: None,
            realization: None,
            ert: None,
        }
    }

    /// Case context with a known case block
    pub fn for_case(casepath: impl Into<PathBuf>, case: Case) -> Self {
        Self {
            fmu_context: Some(FmuContext::Case),
            casepath: Some(casepath.into()),
            case: Some(case),
            ..Self::outside_fmu()
        }
    }

    /// Case context with the case block read from the case root
    pub fn load_case(casepath: impl Into<PathBuf>) -> DataioResult<Self> {
        let casepath = casepath.into();
        let case = required_case(&casepath)?;
        Ok(Self::for_case(casepath, case))
    }

    /// Realization context. The realization uuid is derived from case,
    /// ensemble and realization number.
    pub fn for_realization(
        casepath: impl Into<PathBuf>,
        case: Case,
        ensemble: Ensemble,
        realization_id: u32,
    ) -> Self {
        let realization = Realization {
            id: realization_id,
            name: format!("{}{}", REALIZATION_PREFIX, realization_id),
            uuid: ids::realization_uuid(&case.uuid, &ensemble.uuid, realization_id),
            is_reference: None,
        };
        Self {
            fmu_context: Some(FmuContext::Realization),
            casepath: Some(casepath.into()),
            case: Some(case),
            ensemble: Some(ensemble),
            realization: Some(realization),
            ert: None,
        }
    }

    pub fn with_ert(mut self, ert: Ert) -> Self {
        self.ert = Some(ert);
        self
    }

    /// Detects the context from the process environment
    pub fn from_env(casepath: Option<&Path>) -> DataioResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), casepath)
    }

    /// Detects the context from `lookup`, which stands in for the
    /// environment.
    ///
    /// # Errors
    ///
    /// `Context` when the runpath does not have the
    /// `<case>/realization-N/<ensemble>` shape, `_ERT_REALIZATION_NUMBER`
    /// disagrees with it, an ERT value cannot be parsed, or the case
    /// metadata is missing.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        casepath: Option<&Path>,
    ) -> DataioResult<Self> {
        let Some(runpath) = lookup(ERT_RUNPATH).filter(|v| !v.is_empty()) else {
            return match casepath {
                Some(path) => Self::load_case(path),
                None => Ok(Self::outside_fmu()),
            };
        };

        let runpath = PathBuf::from(runpath);
        let (derived_casepath, realization_dir, ensemble_name) = split_runpath(&runpath)?;
        let casepath = casepath.map(Path::to_path_buf).unwrap_or(derived_casepath);
        let case = required_case(&casepath)?;

        let realization_id = parse_number(
            ERT_RUNPATH,
            realization_dir.trim_start_matches(REALIZATION_PREFIX),
        )?;
        if let Some(raw) = lookup(ERT_REALIZATION_NUMBER) {
            let reported = parse_number(ERT_REALIZATION_NUMBER, &raw)?;
            if reported != realization_id {
                return Err(DataioError::context(format!(
                    "{} is {} but the runpath '{}' is realization {}",
                    ERT_REALIZATION_NUMBER,
                    reported,
                    runpath.display(),
                    realization_id
                )));
            }
        }
        let ensemble_id = match lookup(ERT_ITERATION_NUMBER) {
            Some(raw) => parse_number(ERT_ITERATION_NUMBER, &raw)?,
            None => 0,
        };
        let ensemble_uuid = match lookup(ERT_ENSEMBLE_ID) {
            Some(raw) => parse_uuid(ERT_ENSEMBLE_ID, &raw)?,
            None => ids::ensemble_uuid(&case.uuid, &ensemble_name),
        };
        let ensemble = Ensemble {
            id: ensemble_id,
            name: ensemble_name,
            uuid: ensemble_uuid,
            restart_from: None,
        };

        let ert = match (lookup(ERT_EXPERIMENT_ID), lookup(ERT_SIMULATION_MODE)) {
            (Some(experiment), Some(mode)) => Some(Ert {
                experiment: ErtExperiment {
                    id: parse_uuid(ERT_EXPERIMENT_ID, &experiment)?,
                },
                simulation_mode: mode.parse::<SimulationMode>().map_err(|e| {
                    DataioError::context(format!("{}: {}", ERT_SIMULATION_MODE, e))
                })?,
            }),
            _ => None,
        };

        let mut context = Self::for_realization(casepath, case, ensemble, realization_id);
        context.ert = ert;
        Ok(context)
    }

    pub fn fmu_context(&self) -> Option<FmuContext> {
        self.fmu_context
    }

    pub fn is_fmu(&self) -> bool {
        self.fmu_context.is_some()
    }

    pub fn casepath(&self) -> Option<&Path> {
        self.casepath.as_deref()
    }

    pub fn case(&self) -> Option<&Case> {
        self.case.as_ref()
    }

    pub fn ensemble(&self) -> Option<&Ensemble> {
        self.ensemble.as_ref()
    }

    pub fn realization(&self) -> Option<&Realization> {
        self.realization.as_ref()
    }

    pub fn ert(&self) -> Option<&Ert> {
        self.ert.as_ref()
    }

    /// Stage documents built in this context carry
    pub fn stage(&self) -> Option<ContextStage> {
        match self.fmu_context? {
            FmuContext::Case => Some(ContextStage::Case),
            FmuContext::Realization => Some(ContextStage::Realization),
        }
    }

    /// `realization-N/<ensemble>` in realization context
    pub fn realization_prefix(&self) -> Option<PathBuf> {
        match (&self.realization, &self.ensemble) {
            (Some(real), Some(ens)) => Some(PathBuf::from(&real.name).join(&ens.name)),
            _ => None,
        }
    }

    /// Directory relative paths of this run start from: the runpath in
    /// realization context, the case root in case context.
    pub fn root_path(&self) -> Option<PathBuf> {
        let casepath = self.casepath.as_ref()?;
        Some(match self.realization_prefix() {
            Some(prefix) => casepath.join(prefix),
            None => casepath.clone(),
        })
    }
}

/// Reads `<casepath>/share/metadata/fmu_case.yml`, if present
pub fn load_case_metadata(casepath: &Path) -> DataioResult<Option<MetadataDocument>> {
    let path = casepath.join(CASE_METADATA_RELATIVE_PATH);
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path)?;
    Ok(Some(MetadataDocument::from_yaml_str(&raw)?))
}

fn required_case(casepath: &Path) -> DataioResult<Case> {
    load_case_metadata(casepath)?
        .map(|doc| doc.fmu.case)
        .ok_or_else(|| {
            DataioError::context(format!(
                "no case metadata at '{}'; create the case first",
                casepath.join(CASE_METADATA_RELATIVE_PATH).display()
            ))
        })
}

/// Splits `<case>/realization-N/<ensemble>` into its three parts
fn split_runpath(runpath: &Path) -> DataioResult<(PathBuf, String, String)> {
    let parts: Vec<&str> = runpath
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();
    let invalid = || {
        DataioError::context(format!(
            "runpath '{}' is not <case>/realization-N/<ensemble>",
            runpath.display()
        ))
    };
    let [.., realization_dir, ensemble_name] = parts.as_slice() else {
        return Err(invalid());
    };
    if !realization_dir.starts_with(REALIZATION_PREFIX) {
        return Err(invalid());
    }
    let casepath = runpath
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .ok_or_else(invalid)?;
    Ok((casepath, realization_dir.to_string(), ensemble_name.to_string()))
}

fn parse_number(name: &str, raw: &str) -> DataioResult<u32> {
    raw.trim()
        .parse()
        .map_err(|_| DataioError::context(format!("{} '{}' is not a number", name, raw)))
}

fn parse_uuid(name: &str, raw: &str) -> DataioResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| DataioError::context(format!("{} '{}' is not a uuid", name, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::CaseMetadataBuilder;
    use crate::config::GlobalConfiguration;
    use crate::metadata::User;
    use std::collections::HashMap;

    fn case() -> Case {
        Case {
            name: "snakeoil".into(),
            uuid: Uuid::new_v4(),
            user: User::new("tester"),
            description: None,
        }
    }

    fn ensemble(case: &Case) -> Ensemble {
        Ensemble {
            id: 0,
            name: "iter-0".into(),
            uuid: ids::ensemble_uuid(&case.uuid, "iter-0"),
            restart_from: None,
        }
    }

    #[test]
    fn test_outside_fmu() {
        let ctx = RunContext::outside_fmu();
        assert!(!ctx.is_fmu());
        assert!(ctx.stage().is_none());
        assert!(ctx.root_path().is_none());
    }

    #[test]
    fn test_realization_paths() {
        let case = case();
        let ens = ensemble(&case);
        let ctx = RunContext::for_realization("/scratch/snakeoil", case, ens, 3);
        assert_eq!(ctx.stage(), Some(ContextStage::Realization));
        assert_eq!(ctx.realization().unwrap().name, "realization-3");
        assert_eq!(
            ctx.root_path().unwrap(),
            PathBuf::from("/scratch/snakeoil/realization-3/iter-0")
        );
    }

    #[test]
    fn test_no_ert_no_casepath_is_outside() {
        let ctx = RunContext::from_lookup(|_| None, None).unwrap();
        assert!(!ctx.is_fmu());
    }

    #[test]
    fn test_missing_case_metadata_is_context_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let runpath = dir.path().join("realization-0/iter-0");
        let env: HashMap<&str, String> =
            [(ERT_RUNPATH, runpath.display().to_string())].into_iter().collect();

        let err = RunContext::from_lookup(|k| env.get(k).cloned(), None).unwrap_err();
        assert!(matches!(err, DataioError::Context(_)));
    }

    const CONFIG: &str = r#"
model: {name: ff, revision: 21.1.0}
masterdata:
  smda:
    country: [{identifier: Norway, uuid: ad214d85-8a1d-19da-e053-c918a4889309}]
    discovery: [{short_identifier: DROGON, uuid: ad214d85-8a1d-19da-e053-c918a4889309}]
    field: [{identifier: DROGON, uuid: 00000000-0000-0000-0000-000000000000}]
    coordinate_system: {identifier: ST_WGS84_UTM37N_P32637, uuid: ad214d85-dac7-19da-e053-c918a4889309}
    stratigraphic_column: {identifier: DROGON_HAS_NO_STRATCOLUMN, uuid: 00000000-0000-0000-0000-000000000000}
access:
  asset: {name: Drogon}
  classification: internal
"#;

    const ENSEMBLE_ID: &str = "0b8a1c5e-3d57-4c55-9a53-6f3a7d1f2e01";
    const EXPERIMENT_ID: &str = "7c4e2b9d-1a36-4f8e-b2d0-5e9f8a6c3b12";

    /// Case root with case metadata on disk
    fn case_root() -> (tempfile::TempDir, Case) {
        let dir = tempfile::TempDir::new().unwrap();
        let config = GlobalConfiguration::from_yaml_str(CONFIG).unwrap();
        let doc = CaseMetadataBuilder::new(&config, dir.path(), "snakeoil", "tester")
            .unwrap()
            .build();
        let path = dir.path().join(CASE_METADATA_RELATIVE_PATH);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, doc.to_yaml_string().unwrap()).unwrap();
        (dir, doc.fmu.case)
    }

    fn ert_env(root: &Path, realization: &str) -> HashMap<&'static str, String> {
        let runpath = root.join(format!("realization-{}", realization)).join("iter-1");
        [
            (ERT_RUNPATH, runpath.display().to_string()),
            (ERT_REALIZATION_NUMBER, realization.to_string()),
            (ERT_ITERATION_NUMBER, "1".to_string()),
            (ERT_ENSEMBLE_ID, ENSEMBLE_ID.to_string()),
            (ERT_EXPERIMENT_ID, EXPERIMENT_ID.to_string()),
            (ERT_SIMULATION_MODE, "ensemble_smoother".to_string()),
        ]
        .into_iter()
        .collect()
    }

    fn detect(env: &HashMap<&'static str, String>) -> DataioResult<RunContext> {
        RunContext::from_lookup(|k| env.get(k).cloned(), None)
    }

    #[test]
    fn test_ert_variables_fill_context() {
        let (dir, case) = case_root();
        let ctx = detect(&ert_env(dir.path(), "3")).unwrap();

        assert_eq!(ctx.fmu_context(), Some(FmuContext::Realization));
        assert_eq!(ctx.casepath(), Some(dir.path()));
        assert_eq!(ctx.case().unwrap().uuid, case.uuid);

        let ensemble = ctx.ensemble().unwrap();
        assert_eq!(ensemble.id, 1);
        assert_eq!(ensemble.name, "iter-1");
        assert_eq!(ensemble.uuid, Uuid::parse_str(ENSEMBLE_ID).unwrap());
        assert_eq!(ctx.realization().unwrap().id, 3);

        let ert = ctx.ert().unwrap();
        assert_eq!(ert.experiment.id, Uuid::parse_str(EXPERIMENT_ID).unwrap());
        assert_eq!(ert.simulation_mode, SimulationMode::EnsembleSmoother);
    }

    #[test]
    fn test_ensemble_uuid_derived_without_ensemble_id() {
        let (dir, case) = case_root();
        let mut env = ert_env(dir.path(), "0");
        env.remove(ERT_ENSEMBLE_ID);
        env.remove(ERT_SIMULATION_MODE);

        let ctx = detect(&env).unwrap();
        assert_eq!(
            ctx.ensemble().unwrap().uuid,
            ids::ensemble_uuid(&case.uuid, "iter-1")
        );
        assert!(ctx.ert().is_none());
    }

    #[test]
    fn test_malformed_ert_values_rejected() {
        let (dir, _) = case_root();
        for (key, value) in [
            (ERT_ENSEMBLE_ID, "not-a-uuid"),
            (ERT_EXPERIMENT_ID, "12345"),
            (ERT_SIMULATION_MODE, "history_match"),
            (ERT_ITERATION_NUMBER, "one"),
            (ERT_REALIZATION_NUMBER, "-2"),
        ] {
            let mut env = ert_env(dir.path(), "2");
            env.insert(key, value.to_string());
            let err = detect(&env).unwrap_err();
            assert!(
                matches!(err, DataioError::Context(_)),
                "{} = {} gave {:?}",
                key,
                value,
                err
            );
        }
    }

    #[test]
    fn test_realization_number_must_match_runpath() {
        let (dir, _) = case_root();
        let mut env = ert_env(dir.path(), "4");
        env.insert(ERT_REALIZATION_NUMBER, "5".to_string());
        assert!(matches!(detect(&env), Err(DataioError::Context(_))));

        env.remove(ERT_REALIZATION_NUMBER);
        assert_eq!(detect(&env).unwrap().realization().unwrap().id, 4);
    }

    #[test]
    fn test_bad_runpath_shape() {
        let err = split_runpath(Path::new("/scratch/case/iter-0")).unwrap_err();
        assert!(matches!(err, DataioError::Context(_)));

        let (casepath, real, ens) =
            split_runpath(Path::new("/scratch/case/realization-7/pred")).unwrap();
        assert_eq!(casepath, PathBuf::from("/scratch/case"));
        assert_eq!(real, "realization-7");
        assert_eq!(ens, "pred");
    }
}
