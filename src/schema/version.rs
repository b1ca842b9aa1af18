//! Version increment rules between two schema documents
//!
//! | Change | Required bump |
//! |---|---|
//! | `content` value removed | major |
//! | property removed, or made required | major |
//! | `content` value added | minor |
//! | optional property added, or required made optional | minor |
//! | anything else | patch |
//!
//! While both versions have major `0`, a minor increment satisfies a
//! major requirement.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use semver::Version;
use serde_json::Value;

/// Size of a version increment, ordered from none to major
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VersionBump {
    None,
    Patch,
    Minor,
    Major,
}

impl VersionBump {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionBump::None => "none",
            VersionBump::Patch => "patch",
            VersionBump::Minor => "minor",
            VersionBump::Major => "major",
        }
    }

    /// Increment between two declared versions
    pub fn between(old: &Version, new: &Version) -> Self {
        if new.major != old.major {
            VersionBump::Major
        } else if new.minor != old.minor {
            VersionBump::Minor
        } else if new.patch != old.patch || new.pre != old.pre {
            VersionBump::Patch
        } else {
            VersionBump::None
        }
    }
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Smallest increment that may carry the changes from `old` to `new`.
pub fn required_bump(old: &Value, new: &Value) -> VersionBump {
    let old_content = content_values(old);
    let new_content = content_values(new);
    let old_props = property_map(old);
    let new_props = property_map(new);

    let mut bump = VersionBump::None;

    if old_content.difference(&new_content).next().is_some() {
        return VersionBump::Major;
    }
    if new_content.difference(&old_content).next().is_some() {
        bump = VersionBump::Minor;
    }

    for (path, was_required) in &old_props {
        match new_props.get(path) {
            None => return VersionBump::Major,
            Some(true) if !was_required => return VersionBump::Major,
            Some(false) if *was_required => bump = bump.max(VersionBump::Minor),
            _ => {}
        }
    }
    for (path, required) in &new_props {
        if !old_props.contains_key(path) {
            if *required {
                return VersionBump::Major;
            }
            bump = bump.max(VersionBump::Minor);
        }
    }

    if bump == VersionBump::None && strip_identity(old) != strip_identity(new) {
        bump = VersionBump::Patch;
    }
    bump
}

/// Checks that the versions declared by `old` and `new` increase by at
/// least the required amount. Returns the required bump on success.
pub fn check_bump(old: &Value, new: &Value) -> Result<VersionBump, String> {
    let old_version = declared_version(old)?;
    let new_version = declared_version(new)?;

    if new_version <= old_version {
        return Err(format!(
            "version {} does not follow {}",
            new_version, old_version
        ));
    }

    let required = required_bump(old, new);
    let actual = VersionBump::between(&old_version, &new_version);
    let pre_release_major =
        old_version.major == 0 && new_version.major == 0 && actual == VersionBump::Minor;

    if actual >= required || (required == VersionBump::Major && pre_release_major) {
        Ok(required)
    } else {
        Err(format!(
            "changes from {} need a {} bump, got {}",
            old_version, required, actual
        ))
    }
}

fn declared_version(doc: &Value) -> Result<Version, String> {
    let raw = doc
        .get("version")
        .and_then(Value::as_str)
        .ok_or_else(|| "schema declares no 'version'".to_string())?;
    Version::parse(raw).map_err(|e| format!("version '{}' is not semver: {}", raw, e))
}

fn content_values(doc: &Value) -> BTreeSet<String> {
    doc.pointer("/$defs/Content/enum")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Every declared property keyed by its schema location, with whether
/// the enclosing object requires it.
fn property_map(doc: &Value) -> BTreeMap<String, bool> {
    let mut out = BTreeMap::new();
    collect_properties(doc, String::new(), &mut out);
    out
}

fn collect_properties(node: &Value, path: String, out: &mut BTreeMap<String, bool>) {
    match node {
        Value::Object(map) => {
            if let Some(Value::Object(props)) = map.get("properties") {
                let required: BTreeSet<&str> = map
                    .get("required")
                    .and_then(Value::as_array)
                    .map(|r| r.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();
                for name in props.keys() {
                    out.insert(
                        format!("{}/properties/{}", path, name),
                        required.contains(name.as_str()),
                    );
                }
            }
            for (key, child) in map {
                collect_properties(child, format!("{}/{}", path, key), out);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                collect_properties(child, format!("{}/{}", path, i), out);
            }
        }
        _ => {}
    }
}

fn strip_identity(doc: &Value) -> Value {
    let mut doc = doc.clone();
    if let Value::Object(map) = &mut doc {
        map.remove("$id");
        map.remove("version");
        if let Some(Value::Object(props)) = map.get_mut("properties") {
            props.remove("version");
        }
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(version: &str, content: &[&str], required: &[&str], props: &[&str]) -> Value {
        let properties: serde_json::Map<String, Value> = props
            .iter()
            .map(|p| (p.to_string(), json!({"type": "string"})))
            .collect();
        json!({
            "$id": format!("https://example.test/{}", version),
            "version": version,
            "type": "object",
            "required": required,
            "properties": properties,
            "$defs": {"Content": {"type": "string", "enum": content}}
        })
    }

    #[test]
    fn test_identical_documents_need_no_bump() {
        let a = schema("1.0.0", &["depth"], &["name"], &["name"]);
        let b = schema("1.0.1", &["depth"], &["name"], &["name"]);
        assert_eq!(required_bump(&a, &b), VersionBump::None);
    }

    #[test]
    fn test_removed_content_value_is_major() {
        let a = schema("1.0.0", &["depth", "time"], &[], &[]);
        let b = schema("1.1.0", &["depth"], &[], &[]);
        assert_eq!(required_bump(&a, &b), VersionBump::Major);
        assert!(check_bump(&a, &b).is_err());
    }

    #[test]
    fn test_added_content_value_is_minor() {
        let a = schema("1.0.0", &["depth"], &[], &[]);
        let b = schema("1.1.0", &["depth", "named_area"], &[], &[]);
        assert_eq!(required_bump(&a, &b), VersionBump::Minor);
        assert_eq!(check_bump(&a, &b), Ok(VersionBump::Minor));
    }

    #[test]
    fn test_added_required_property_is_major() {
        let a = schema("1.0.0", &[], &["name"], &["name"]);
        let b = schema("2.0.0", &[], &["name", "unit"], &["name", "unit"]);
        assert_eq!(required_bump(&a, &b), VersionBump::Major);
        assert!(check_bump(&a, &b).is_ok());
    }

    #[test]
    fn test_added_optional_property_is_minor() {
        let a = schema("1.0.0", &[], &["name"], &["name"]);
        let b = schema("1.0.1", &[], &["name"], &["name", "unit"]);
        assert_eq!(required_bump(&a, &b), VersionBump::Minor);
        assert!(check_bump(&a, &b).is_err());
    }

    #[test]
    fn test_relaxed_required_property_is_minor() {
        let a = schema("1.0.0", &[], &["name", "unit"], &["name", "unit"]);
        let b = schema("1.1.0", &[], &["name"], &["name", "unit"]);
        assert_eq!(required_bump(&a, &b), VersionBump::Minor);
    }

    #[test]
    fn test_other_change_is_patch() {
        let a = schema("1.0.0", &[], &[], &["name"]);
        let mut b = schema("1.0.1", &[], &[], &["name"]);
        b["title"] = json!("Renamed");
        assert_eq!(required_bump(&a, &b), VersionBump::Patch);
        assert_eq!(check_bump(&a, &b), Ok(VersionBump::Patch));
    }

    #[test]
    fn test_minor_satisfies_major_below_one() {
        let a = schema("0.8.0", &["depth", "time"], &[], &[]);
        let b = schema("0.9.0", &["depth"], &[], &[]);
        assert_eq!(check_bump(&a, &b), Ok(VersionBump::Major));

        let c = schema("0.8.1", &["depth"], &[], &[]);
        assert!(check_bump(&a, &c).is_err());
    }

    #[test]
    fn test_version_must_increase() {
        let a = schema("1.0.0", &[], &[], &[]);
        let b = schema("1.0.0", &[], &[], &[]);
        assert!(check_bump(&a, &b).is_err());
    }
}
