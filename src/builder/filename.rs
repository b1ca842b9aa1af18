//! File naming and share folder rules
//!
//! A stem is `parent--name--tagname--time` from the non-empty parts. The
//! time part is `t1_t0`, or `t0_t1` when reversed, with dates as
//! `YYYYMMDD`.

use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{DataioError, DataioResult};

const SEPARATOR: &str = "--";
const DATE_FORMAT: &str = "%Y%m%d";

pub const SHARE_RESULTS: &str = "share/results";
pub const SHARE_OBSERVATIONS: &str = "share/observations";
pub const SHARE_PREPROCESSED: &str = "share/preprocessed";

/// Lowercases, replaces `.` and spaces by `_`, spells out `æ ø å` and
/// collapses runs of `_`.
pub fn sanitize(part: &str) -> String {
    static UNDERSCORES: OnceLock<Option<Regex>> = OnceLock::new();

    let mut out = String::with_capacity(part.len());
    for c in part.chars() {
        match c {
            '.' | ' ' => out.push('_'),
            'æ' | 'Æ' => out.push_str("ae"),
            'ø' | 'Ø' => out.push_str("oe"),
            'å' | 'Å' => out.push_str("aa"),
            other => out.push(other),
        }
    }
    let collapsed = match UNDERSCORES.get_or_init(|| Regex::new("__+").ok()) {
        Some(re) => re.replace_all(&out, "_").into_owned(),
        None => out,
    };
    collapsed.to_lowercase()
}

/// Builds the file stem.
///
/// # Errors
///
/// `InvalidInput` when `name` is empty, or `t1` is given without `t0`.
pub fn file_stem(
    parent: Option<&str>,
    name: &str,
    tagname: Option<&str>,
    t0: Option<NaiveDate>,
    t1: Option<NaiveDate>,
    reverse: bool,
) -> DataioResult<String> {
    if name.trim().is_empty() {
        return Err(DataioError::invalid_input(
            "a name is required to build a file name",
        ));
    }

    let timepart = match (t0, t1) {
        (None, None) => None,
        (None, Some(_)) => {
            return Err(DataioError::invalid_input(
                "time1 is given but time0 is missing",
            ))
        }
        (Some(t0), None) => Some(t0.format(DATE_FORMAT).to_string()),
        (Some(t0), Some(t1)) => {
            let (first, second) = if reverse { (t0, t1) } else { (t1, t0) };
            Some(format!(
                "{}_{}",
                first.format(DATE_FORMAT),
                second.format(DATE_FORMAT)
            ))
        }
    };

    let parts: Vec<String> = [parent, Some(name), tagname, timepart.as_deref()]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .map(sanitize)
        .collect();
    Ok(parts.join(SEPARATOR))
}

/// `share/<results|observations|preprocessed>/<folder>[/<subfolder>]`
///
/// `forcefolder` replaces the object's default folder and must be
/// relative; `subfolder` must be a single path component.
pub fn share_folder(
    preprocessed: bool,
    is_observation: bool,
    default_folder: &str,
    forcefolder: Option<&str>,
    subfolder: Option<&str>,
) -> DataioResult<PathBuf> {
    let base = if preprocessed {
        SHARE_PREPROCESSED
    } else if is_observation {
        SHARE_OBSERVATIONS
    } else {
        SHARE_RESULTS
    };
    let mut folder = PathBuf::from(base);

    match forcefolder.filter(|f| !f.is_empty()) {
        Some(force) => {
            let force_path = Path::new(force);
            if force_path.is_absolute()
                || force_path
                    .components()
                    .any(|c| !matches!(c, Component::Normal(_)))
            {
                return Err(DataioError::invalid_input(format!(
                    "forcefolder '{}' must be a relative path without '..'",
                    force
                )));
            }
            folder.push(force_path);
        }
        None => folder.push(default_folder),
    }

    if let Some(sub) = subfolder.filter(|s| !s.is_empty()) {
        let mut components = Path::new(sub).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => folder.push(sub),
            _ => {
                return Err(DataioError::invalid_input(format!(
                    "subfolder '{}' must be a single folder name",
                    sub
                )))
            }
        }
    }
    Ok(folder)
}

/// Forward-slash rendering of a relative path, as stored in `file`
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("VOLANTIS GP. Top"), "volantis_gp_top");
        assert_eq!(sanitize("Ærø å"), "aeroe_aa");
        assert_eq!(sanitize("a__b___c"), "a_b_c");
    }

    #[test]
    fn test_stem_parts() {
        let stem = file_stem(Some("geogrid"), "TopVolantis", Some("DS_extract"), None, None, false)
            .unwrap();
        assert_eq!(stem, "geogrid--topvolantis--ds_extract");
    }

    #[test]
    fn test_stem_time_order() {
        let t0 = date("20180101");
        let t1 = date("20200701");
        assert_eq!(
            file_stem(None, "swat", None, t0, t1, false).unwrap(),
            "swat--20200701_20180101"
        );
        assert_eq!(
            file_stem(None, "swat", None, t0, t1, true).unwrap(),
            "swat--20180101_20200701"
        );
        assert_eq!(file_stem(None, "swat", None, t0, None, false).unwrap(), "swat--20180101");
    }

    #[test]
    fn test_stem_errors() {
        assert!(matches!(
            file_stem(None, "", None, None, None, false),
            Err(DataioError::InvalidInput(_))
        ));
        assert!(matches!(
            file_stem(None, "x", None, None, date("20200101"), false),
            Err(DataioError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_share_folder() {
        assert_eq!(
            share_folder(false, false, "maps", None, None).unwrap(),
            PathBuf::from("share/results/maps")
        );
        assert_eq!(
            share_folder(false, true, "maps", Some("custom"), Some("sub")).unwrap(),
            PathBuf::from("share/observations/custom/sub")
        );
        assert_eq!(
            share_folder(true, true, "tables", None, None).unwrap(),
            PathBuf::from("share/preprocessed/tables")
        );
    }

    #[test]
    fn test_share_folder_rejects_escapes() {
        assert!(share_folder(false, false, "maps", Some("/abs"), None).is_err());
        assert!(share_folder(false, false, "maps", Some("../up"), None).is_err());
        assert!(share_folder(false, false, "maps", None, Some("a/b")).is_err());
    }
}
