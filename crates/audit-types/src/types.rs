use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// Reply appended to a transcript when the chat backend fails
pub const CHAT_FALLBACK_REPLY: &str = "Sorry, there was an error processing your request.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    // Early transcripts were persisted with "bot"
    #[serde(alias = "bot")]
    Assistant,
}

/// One turn of a document chat transcript
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String, // May contain markdown
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// The fixed assistant turn used when a chat request fails
    pub fn fallback() -> Self {
        Self::assistant(CHAT_FALLBACK_REPLY)
    }
}

/// An entry of the recently-uploaded list
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UploadedFile {
    pub id: String,
    pub filename: String,
    pub timestamp: DateTime<Utc>,
}

/// Filename to document id mapping produced by an upload
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoredFile {
    pub filename: String,
    pub id: String,
}

/// The most recent upload result, read back by the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(from = "StoredBatchRecord")]
pub struct StoredBatch {
    pub user: String, // Primary (session) id
    pub files: Vec<StoredFile>,
}

/// Either record shape found under the batch key. Older clients saved the
/// raw upload response, `{ids: [{filename: id}], user}`.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum StoredBatchRecord {
    Files {
        user: String,
        files: Vec<StoredFile>,
    },
    UploadResponse {
        user: String,
        ids: Vec<IndexMap<String, String>>,
    },
}

impl From<StoredBatchRecord> for StoredBatch {
    fn from(record: StoredBatchRecord) -> Self {
        match record {
            StoredBatchRecord::Files { user, files } => Self { user, files },
            StoredBatchRecord::UploadResponse { user, ids } => Self {
                user,
                files: ids
                    .into_iter()
                    .flatten()
                    .map(|(filename, id)| StoredFile { filename, id })
                    .collect(),
            },
        }
    }
}

impl StoredBatch {
    pub fn ids(&self) -> Vec<String> {
        self.files.iter().map(|f| f.id.clone()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.files.iter().any(|f| f.id == id)
    }
}

/// Backend metadata for one uploaded document
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileInfo {
    pub file_name: String,
    pub file_size: String,
    pub last_edited: String,
    pub page_count: u32,
    pub author: String,
    pub created_at: String,
}

impl FileInfo {
    /// Labelled rows in display order
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("File Name", self.file_name.clone()),
            ("File Size", self.file_size.clone()),
            ("Last Edited", self.last_edited.clone()),
            ("Page Count", self.page_count.to_string()),
            ("Author", self.author.clone()),
            ("Created At", self.created_at.clone()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vulnerability {
    pub description: String,
    pub criticality: f64, // Observed range 0-10
    pub reasoning: String,
    pub mitigation: String,
}

impl Vulnerability {
    pub fn severity(&self) -> Severity {
        Severity::from_criticality(self.criticality)
    }
}

/// Display band of a criticality score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const HIGH_THRESHOLD: f64 = 8.0;
    pub const MEDIUM_THRESHOLD: f64 = 5.0;

    /// Scores >= 8 are high, >= 5 medium, everything else (including NaN) low
    pub fn from_criticality(score: f64) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            Severity::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Indicator color shown next to a vulnerability
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Low => "green",
            Severity::Medium => "yellow",
            Severity::High => "red",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the band only depends on the two thresholds
        #[test]
        fn severity_band_matches_thresholds(score in 0.0f64..=10.0) {
            let expected = if score >= 8.0 {
                Severity::High
            } else if score >= 5.0 {
                Severity::Medium
            } else {
                Severity::Low
            };
            prop_assert_eq!(Severity::from_criticality(score), expected);
        }

        /// Property: integer scores band the same as their float form
        #[test]
        fn severity_integer_scores(score in 0u8..=10) {
            let band = Severity::from_criticality(f64::from(score));
            match score {
                8..=10 => prop_assert_eq!(band, Severity::High),
                5..=7 => prop_assert_eq!(band, Severity::Medium),
                _ => prop_assert_eq!(band, Severity::Low),
            }
        }

        /// Property: a higher score never lands in a lower band
        #[test]
        fn severity_is_monotonic(a in 0.0f64..=10.0, b in 0.0f64..=10.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(Severity::from_criticality(lo) <= Severity::from_criticality(hi));
        }
    }
}
