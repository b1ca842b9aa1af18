//! Document blocks other than `data`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{
    Classification, ContextStage, SimulationMode, StandardResultName, TracklogEventType,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
}

/// Software versions recorded with a tracklog event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInformation {
    #[serde(rename = "fmu-dataio", default, skip_serializing_if = "Option::is_none")]
    pub fmu_dataio: Option<VersionInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub komodo: Option<VersionInfo>,
}

impl SystemInformation {
    /// This library's version plus the Komodo release from the environment
    pub fn current() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let komodo = lookup("KOMODO_RELEASE")
            .or_else(|| lookup("KOMODO_RELEASE_BACKUP"))
            .filter(|v| !v.is_empty())
            .map(|version| VersionInfo { version });
        Self {
            fmu_dataio: Some(VersionInfo {
                version: env!("CARGO_PKG_VERSION").to_string(),
            }),
            komodo,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracklogEvent {
    pub datetime: DateTime<Utc>,
    pub event: TracklogEventType,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sysinfo: Option<SystemInformation>,
}

/// Ordered provenance events, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tracklog(pub Vec<TracklogEvent>);

impl Tracklog {
    /// A tracklog holding one `created` event stamped now
    pub fn initialize(user: &str) -> Self {
        Tracklog(vec![TracklogEvent {
            datetime: Utc::now(),
            event: TracklogEventType::Created,
            user: User::new(user),
            sysinfo: Some(SystemInformation::current()),
        }])
    }

    /// Appends an event stamped now
    pub fn record(&mut self, event: TracklogEventType, user: &str) {
        self.0.push(TracklogEvent {
            datetime: Utc::now(),
            event,
            user: User::new(user),
            sysinfo: Some(SystemInformation::current()),
        });
    }

    pub fn events(&self) -> &[TracklogEvent] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub revision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub name: String,
    pub uuid: Uuid,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub stage: ContextStage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ensemble {
    pub id: u32,
    pub name: String,
    pub uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_from: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Realization {
    pub id: u32,
    pub name: String,
    pub uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_reference: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    pub id: Uuid,
    pub operation: String,
    pub realization_ids: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub reference: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub uuid: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErtExperiment {
    pub id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ert {
    pub experiment: ErtExperiment,
    pub simulation_mode: SimulationMode,
}

/// The `fmu` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fmu {
    pub model: Model,
    pub case: Case,
    pub context: Context,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ensemble: Option<Ensemble>,
    /// Mirror of `ensemble` for readers of the pre-0.10 layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration: Option<Ensemble>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realization: Option<Realization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Workflow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<Entity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ert: Option<Ert>,
}

impl Fmu {
    /// The ensemble block under either of its names
    pub fn ensemble_block(&self) -> Option<&Ensemble> {
        self.ensemble.as_ref().or(self.iteration.as_ref())
    }

    /// Sets `ensemble` and its `iteration` mirror together
    pub fn set_ensemble(&mut self, ensemble: Option<Ensemble>) {
        self.iteration = ensemble.clone();
        self.ensemble = ensemble;
    }
}

/// The `file` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub relative_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runpath_relative_path: Option<String>,
    pub checksum_md5: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ssdl {
    pub access_level: Classification,
    pub rep_include: bool,
}

/// The `access` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Access {
    pub asset: Asset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssdl: Option<Ssdl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmdaItem {
    pub identifier: String,
    pub uuid: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryItem {
    pub short_identifier: String,
    pub uuid: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Smda {
    pub coordinate_system: SmdaItem,
    pub country: Vec<SmdaItem>,
    pub discovery: Vec<DiscoveryItem>,
    pub field: Vec<SmdaItem>,
    pub stratigraphic_column: SmdaItem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Masterdata {
    pub smda: Smda,
}

/// Payload schema a standard result was validated against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSchema {
    pub version: String,
    pub url: String,
}

/// The `standard_result` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardResult {
    pub name: StandardResultName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_schema: Option<FileSchema>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Display {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sysinfo_prefers_komodo_release() {
        let info = SystemInformation::from_lookup(|key| match key {
            "KOMODO_RELEASE" => Some("2024.05.01".to_string()),
            "KOMODO_RELEASE_BACKUP" => Some("backup".to_string()),
            _ => None,
        });
        assert_eq!(info.komodo.unwrap().version, "2024.05.01");
        assert_eq!(info.fmu_dataio.unwrap().version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_sysinfo_falls_back_to_backup() {
        let info = SystemInformation::from_lookup(|key| match key {
            "KOMODO_RELEASE_BACKUP" => Some("backup".to_string()),
            _ => None,
        });
        assert_eq!(info.komodo.unwrap().version, "backup");
    }

    #[test]
    fn test_sysinfo_serializes_hyphenated_key() {
        let info = SystemInformation::from_lookup(|_| None);
        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("fmu-dataio").is_some());
        assert!(json.get("komodo").is_none());
    }

    #[test]
    fn test_tracklog_starts_with_created() {
        let mut log = Tracklog::initialize("tester");
        assert_eq!(log.len(), 1);
        assert_eq!(log.events()[0].event, TracklogEventType::Created);

        log.record(TracklogEventType::Merged, "tester");
        assert_eq!(log.events()[1].event, TracklogEventType::Merged);
        assert!(log.events()[0].datetime <= log.events()[1].datetime);
    }

    #[test]
    fn test_set_ensemble_mirrors_iteration() {
        let mut fmu = Fmu {
            model: Model {
                name: "m".into(),
                revision: "r".into(),
                description: None,
            },
            case: Case {
                name: "c".into(),
                uuid: Uuid::nil(),
                user: User::new("u"),
                description: None,
            },
            context: Context {
                stage: ContextStage::Ensemble,
            },
            ensemble: None,
            iteration: None,
            realization: None,
            aggregation: None,
            workflow: None,
            entity: None,
            ert: None,
        };
        fmu.set_ensemble(Some(Ensemble {
            id: 0,
            name: "iter-0".into(),
            uuid: Uuid::nil(),
            restart_from: None,
        }));
        assert_eq!(fmu.ensemble, fmu.iteration);
        assert_eq!(fmu.ensemble_block().unwrap().name, "iter-0");
    }
}
