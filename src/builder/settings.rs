//! Per-export settings
//!
//! Everything the caller decides about one export. Fields left `None` fall
//! back to the object, the global configuration or the run context.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DataioError, DataioResult};
use crate::metadata::{
    Classification, Content, DomainReference, FieldOutline, FieldRegion, FluidContact, Seismic,
    StandardResultName, Time, Timestamp, VerticalDomain,
};

/// Date layout accepted in `timedata`
pub const TIMEDATA_FORMAT: &str = "%Y%m%d";

/// Block attached under `data.<content>` for contents that need one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentMetadata {
    FieldOutline(FieldOutline),
    FluidContact(FluidContact),
    FieldRegion(FieldRegion),
    Seismic(Seismic),
}

impl ContentMetadata {
    /// The content this block belongs to
    pub fn content(&self) -> Content {
        match self {
            ContentMetadata::FieldOutline(_) => Content::FieldOutline,
            ContentMetadata::FluidContact(_) => Content::FluidContact,
            ContentMetadata::FieldRegion(_) => Content::FieldRegion,
            ContentMetadata::Seismic(_) => Content::Seismic,
        }
    }
}

/// One `timedata` entry: a `YYYYMMDD` date and an optional label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl TimeEntry {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn parse(&self) -> DataioResult<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), TIMEDATA_FORMAT).map_err(|_| {
            DataioError::invalid_input(format!(
                "timedata '{}' is not a YYYYMMDD date",
                self.date
            ))
        })
    }
}

/// Parsed `timedata`: `t0` is the older date
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTime {
    pub t0: Option<(NaiveDate, Option<String>)>,
    pub t1: Option<(NaiveDate, Option<String>)>,
}

impl ResolvedTime {
    pub fn t0_date(&self) -> Option<NaiveDate> {
        self.t0.as_ref().map(|(d, _)| *d)
    }

    pub fn t1_date(&self) -> Option<NaiveDate> {
        self.t1.as_ref().map(|(d, _)| *d)
    }

    /// The `data.time` block, or `None` without dates
    pub fn to_block(&self) -> Option<Time> {
        if self.t0.is_none() && self.t1.is_none() {
            return None;
        }
        let stamp = |entry: &Option<(NaiveDate, Option<String>)>| {
            entry.as_ref().map(|(date, label)| Timestamp {
                value: Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
                label: label.clone(),
            })
        };
        Some(Time {
            t0: stamp(&self.t0),
            t1: stamp(&self.t1),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub name: Option<String>,
    pub tagname: Option<String>,
    pub parent: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<Vec<String>>,

    pub content: Option<Content>,
    pub content_metadata: Option<ContentMetadata>,
    pub unit: Option<String>,
    pub vertical_domain: Option<VerticalDomain>,
    pub domain_reference: Option<DomainReference>,

    pub timedata: Vec<TimeEntry>,
    pub filename_timedata_reverse: bool,

    pub is_prediction: bool,
    pub is_observation: bool,
    pub preprocessed: bool,
    pub undef_is_zero: bool,

    pub classification: Option<Classification>,
    pub rep_include: Option<bool>,

    pub workflow: Option<String>,
    pub subfolder: Option<String>,
    pub forcefolder: Option<String>,
    pub table_index: Option<Vec<String>>,

    pub standard_result: Option<StandardResultName>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            name: None,
            tagname: None,
            parent: None,
            display_name: None,
            description: None,
            content: None,
            content_metadata: None,
            unit: None,
            vertical_domain: None,
            domain_reference: None,
            timedata: Vec::new(),
            filename_timedata_reverse: false,
            is_prediction: true,
            is_observation: false,
            preprocessed: false,
            undef_is_zero: false,
            classification: None,
            rep_include: None,
            workflow: None,
            subfolder: None,
            forcefolder: None,
            table_index: None,
            standard_result: None,
        }
    }
}

impl ExportSettings {
    pub fn new(content: Content) -> Self {
        Self {
            content: Some(content),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tagname(mut self, tagname: impl Into<String>) -> Self {
        self.tagname = Some(tagname.into());
        self
    }

    pub fn with_content_metadata(mut self, metadata: ContentMetadata) -> Self {
        self.content_metadata = Some(metadata);
        self
    }

    pub fn with_timedata(mut self, entries: Vec<TimeEntry>) -> Self {
        self.timedata = entries;
        self
    }

    /// Marks the export as a standard result; its payload is then checked
    /// against the matching file-format schema.
    pub fn with_standard_result(mut self, name: StandardResultName) -> Self {
        self.standard_result = Some(name);
        self
    }

    /// Checks everything that does not need the object or the context.
    ///
    /// Content metadata given for a content that does not take it is not an
    /// error here; the builder drops it with a warning.
    pub fn validate(&self) -> DataioResult<()> {
        let content = self.content.ok_or_else(|| {
            DataioError::invalid_input("content is required for data exports")
        })?;

        if content.requires_metadata() {
            match &self.content_metadata {
                Some(meta) if meta.content() == content => {}
                Some(meta) => {
                    return Err(DataioError::invalid_input(format!(
                        "content '{}' was given metadata for '{}'",
                        content,
                        meta.content()
                    )))
                }
                None => {
                    return Err(DataioError::invalid_input(format!(
                        "content '{}' requires content metadata",
                        content
                    )))
                }
            }
        }

        if let Some(name) = self.standard_result {
            let expected = name.content();
            if content != expected {
                return Err(DataioError::invalid_input(format!(
                    "standard result '{}' must be exported as '{}' content, got '{}'",
                    name, expected, content
                )));
            }
        }

        if self.timedata.len() > 2 {
            return Err(DataioError::invalid_input(format!(
                "timedata holds {} dates, at most 2 are allowed",
                self.timedata.len()
            )));
        }
        self.resolved_time()?;
        Ok(())
    }

    /// Parses `timedata`, ordering the dates so `t0` is the older one
    pub fn resolved_time(&self) -> DataioResult<ResolvedTime> {
        let mut parsed = self
            .timedata
            .iter()
            .map(|entry| Ok((entry.parse()?, entry.label.clone())))
            .collect::<DataioResult<Vec<_>>>()?;
        parsed.sort_by_key(|(date, _)| *date);

        let mut iter = parsed.into_iter();
        Ok(ResolvedTime {
            t0: iter.next(),
            t1: iter.next(),
        })
    }

    /// `vertical_domain` as written: forced by `depth`/`time` content
    pub fn effective_vertical_domain(&self) -> Option<VerticalDomain> {
        match self.content {
            Some(Content::Depth) => Some(VerticalDomain::Depth),
            Some(Content::Time) => Some(VerticalDomain::Time),
            _ => self.vertical_domain,
        }
    }

    /// `domain_reference` as written: `msl` when a domain is forced
    pub fn effective_domain_reference(&self) -> Option<DomainReference> {
        match (self.domain_reference, self.content) {
            (Some(reference), _) => Some(reference),
            (None, Some(content)) if content.requires_vertical_domain() => {
                Some(DomainReference::Msl)
            }
            _ => None,
        }
    }
}
