//! Deterministic identifiers
//!
//! Name-based (v5) UUIDs in the OID namespace, so the same inputs give the
//! same identifier in every process.

use uuid::Uuid;

fn name_based(name: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}

/// Ensemble uuid when ERT does not provide one
pub fn ensemble_uuid(case_uuid: &Uuid, ensemble_name: &str) -> Uuid {
    name_based(&format!("{}{}", case_uuid, ensemble_name))
}

/// Realization uuid from case, ensemble and realization number
pub fn realization_uuid(case_uuid: &Uuid, ensemble_uuid: &Uuid, realization_id: u32) -> Uuid {
    name_based(&format!("{}{}{}", case_uuid, ensemble_uuid, realization_id))
}

/// Entity uuid shared by every realization and aggregation of one object
pub fn entity_uuid(case_uuid: &Uuid, runpath_relative_path: &str) -> Uuid {
    name_based(&format!("{}{}", case_uuid, runpath_relative_path))
}

/// Aggregation id from the uuids of the aggregated realizations, in any order
pub fn aggregation_id(realization_uuids: &[Uuid]) -> Uuid {
    let mut sorted: Vec<String> = realization_uuids.iter().map(Uuid::to_string).collect();
    sorted.sort();
    name_based(&sorted.concat())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realization_uuid_deterministic() {
        let case = Uuid::new_v4();
        let ens = Uuid::new_v4();
        assert_eq!(realization_uuid(&case, &ens, 3), realization_uuid(&case, &ens, 3));
        assert_ne!(realization_uuid(&case, &ens, 3), realization_uuid(&case, &ens, 4));
    }

    #[test]
    fn test_aggregation_id_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(aggregation_id(&[a, b]), aggregation_id(&[b, a]));
        assert_ne!(aggregation_id(&[a]), aggregation_id(&[a, b]));
    }

    #[test]
    fn test_entity_uuid_depends_on_path() {
        let case = Uuid::new_v4();
        assert_ne!(
            entity_uuid(&case, "share/results/maps/a.gri"),
            entity_uuid(&case, "share/results/maps/b.gri")
        );
    }
}
