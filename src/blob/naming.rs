use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DATE_FORMAT: &str = "%Y%m%d";
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Caller-supplied naming: `(original_name, index_in_batch) -> stored_name`
pub type FileNameGenerator = Arc<dyn Fn(&str, usize) -> String + Send + Sync>;

/// Clock used for dated paths and timestamped names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampZone {
    #[default]
    Local,
    Utc,
}

impl TimestampZone {
    pub fn now(&self) -> NaiveDateTime {
        match self {
            TimestampZone::Local => chrono::Local::now().naive_local(),
            TimestampZone::Utc => chrono::Utc::now().naive_utc(),
        }
    }
}

/// `YYYYMMDD`
pub fn dated_sub_path(moment: NaiveDateTime) -> String {
    moment.format(DATE_FORMAT).to_string()
}

/// `YYYYMMDDHHmmss_<original>`; one-second resolution, so same-second
/// uploads of the same name under one prefix collide
pub fn timestamped_name(original: &str, moment: NaiveDateTime) -> String {
    format!("{}_{}", moment.format(TIMESTAMP_FORMAT), original)
}

/// Where one file lands inside the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub path_prefix: String,
    pub dated_sub_path: String,
    pub generated_file_name: String,
}

impl UploadTarget {
    pub fn new(
        path_prefix: &str,
        dated_sub_path: impl Into<String>,
        generated_file_name: impl Into<String>,
    ) -> Self {
        Self {
            path_prefix: path_prefix.trim_matches('/').to_string(),
            dated_sub_path: dated_sub_path.into(),
            generated_file_name: generated_file_name.into(),
        }
    }

    /// `pathPrefix/datedSubPath`, recorded as the attachment's `path`
    pub fn directory(&self) -> String {
        format!("{}/{}", self.path_prefix, self.dated_sub_path)
    }

    pub fn blob_path(&self) -> String {
        format!("{}/{}", self.directory(), self.generated_file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn moment() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(9, 7, 3)
            .unwrap()
    }

    #[test]
    fn test_blob_path_is_deterministic() {
        let at = moment();
        let target = UploadTarget::new(
            "case-42",
            dated_sub_path(at),
            timestamped_name("report.pdf", at),
        );

        assert_eq!(target.directory(), "case-42/20260105");
        assert_eq!(
            target.blob_path(),
            "case-42/20260105/20260105090703_report.pdf"
        );
    }

    #[test]
    fn test_prefix_slashes_trimmed() {
        let target = UploadTarget::new("/case-42/", "20260105", "n.txt");
        assert_eq!(target.blob_path(), "case-42/20260105/n.txt");
    }

    #[test]
    fn test_zone_wire_names() {
        let zone: TimestampZone = serde_json::from_str("\"utc\"").unwrap();
        assert_eq!(zone, TimestampZone::Utc);
        assert_eq!(TimestampZone::default(), TimestampZone::Local);
    }
}
