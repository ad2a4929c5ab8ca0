//! Core types for media-relay

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Unique identifier for a job
///
/// Derived from the submission time in whole Unix seconds, so ids grow
/// monotonically and two submissions in the same second share an id.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct JobId(pub i64);

impl JobId {
    /// Create a new JobId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Id for a job submitted right now
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp())
    }

    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for JobId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<JobId> for i64 {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl PartialEq<i64> for JobId {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Job status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted, pipeline still running
    Pending,
    /// Every resource reached the storage backend
    Succeeded,
    /// Fetch, resolution or at least one upload failed
    Failed,
}

impl JobStatus {
    /// Whether the status is terminal (no further transitions)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }

    /// Lowercase name, as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked unit of work
///
/// Jobs are immutable values. A status change is expressed by building a new
/// `Job` and putting it into the registry under the same id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Job {
    /// Submission time (Unix seconds), doubles as the job id
    #[serde(rename = "timestamp")]
    pub id: JobId,

    /// Raw URL until the upload step, then `<author>-<title>`
    #[serde(rename = "name")]
    pub label: String,

    /// Current status
    pub status: JobStatus,

    /// URL extracted from the submitted text
    pub url: String,

    /// Failure reason for failed jobs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    /// A freshly submitted job, labelled with its URL
    pub fn pending(id: JobId, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id,
            label: url.clone(),
            status: JobStatus::Pending,
            url,
            error: None,
        }
    }

    /// Terminal success, relabelled
    pub fn succeeded(&self, label: impl Into<String>) -> Self {
        Self {
            id: self.id,
            label: label.into(),
            status: JobStatus::Succeeded,
            url: self.url.clone(),
            error: None,
        }
    }

    /// Terminal failure with a reason, relabelled
    pub fn failed(&self, label: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: self.id,
            label: label.into(),
            status: JobStatus::Failed,
            url: self.url.clone(),
            error: Some(error.into()),
        }
    }
}

/// Kind of media behind a post, as tagged by the fetch service
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaKind {
    /// Image set (`图文`): one file per download link
    ImageSet,
    /// Video (`视频`): all links already merged into one file
    Video,
    /// Any other tag the service reports
    Other(String),
}

/// A post without a kind tag is named like an unknown kind, without an extension
impl Default for MediaKind {
    fn default() -> Self {
        MediaKind::Other(String::new())
    }
}

impl MediaKind {
    const IMAGE_SET_TAG: &'static str = "图文";
    const VIDEO_TAG: &'static str = "视频";

    /// Parse the fetch service's tag
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            Self::IMAGE_SET_TAG => MediaKind::ImageSet,
            Self::VIDEO_TAG => MediaKind::Video,
            other => MediaKind::Other(other.to_string()),
        }
    }

    /// The fetch service's tag for this kind
    pub fn tag(&self) -> &str {
        match self {
            MediaKind::ImageSet => Self::IMAGE_SET_TAG,
            MediaKind::Video => Self::VIDEO_TAG,
            MediaKind::Other(tag) => tag,
        }
    }
}

impl Serialize for MediaKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for MediaKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(MediaKind::from_tag(&tag))
    }
}

/// Post metadata returned by the fetch service
///
/// Field names follow the fetch service's JSON keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    /// Author nickname
    #[serde(rename = "作者昵称", default)]
    pub author: String,

    /// Post title
    #[serde(rename = "作品标题", default)]
    pub title: String,

    /// Ordered download links; empty entries carry no file
    #[serde(rename = "下载地址", default)]
    pub download_links: Vec<String>,

    /// Media kind tag
    #[serde(rename = "作品类型", default)]
    pub kind: MediaKind,

    /// Stable item identifier, embedded in downloaded file names
    #[serde(rename = "作品ID", default)]
    pub item_id: String,
}

impl FetchResult {
    /// Job label once the post is known: `<author>-<title>`
    pub fn label(&self) -> String {
        format!("{}-{}", self.author, self.title)
    }

    /// Download links with empty entries removed, in order
    pub fn non_empty_links(&self) -> impl Iterator<Item = &str> {
        self.download_links
            .iter()
            .map(String::as_str)
            .filter(|link| !link.is_empty())
    }
}

/// Envelope of the fetch service's response
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FetchResponse {
    /// Service message
    #[serde(default)]
    pub message: String,

    /// Post metadata
    #[serde(default)]
    pub data: FetchResult,
}

/// Request body sent to the fetch service
#[derive(Clone, Debug, Serialize)]
pub struct FetchRequest<'a> {
    /// Post URL
    pub url: &'a str,
    /// Always true: the service must download the media to disk
    pub download: bool,
    /// Let the service skip posts it has already downloaded
    pub skip: bool,
}

/// One output file implied by a fetch result
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Resource {
    /// Generated file name
    pub file_name: String,
    /// Absolute path in the download directory
    #[schema(value_type = String)]
    pub file_path: PathBuf,
}

/// Result of uploading one resource
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadOutcome {
    /// Whether the storage backend accepted the file
    pub success: bool,
    /// Failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Backend-assigned task id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl UploadOutcome {
    /// Successful upload, with the backend's task id when it queued one
    pub fn succeeded(task_id: Option<String>) -> Self {
        Self {
            success: true,
            error: None,
            task_id,
        }
    }

    /// Failed upload with a description
    pub fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            task_id: None,
        }
    }
}

/// Per-resource outcomes of an upload batch
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadReport {
    /// One outcome per resource, in resource order
    pub outcomes: Vec<UploadOutcome>,
    /// Logical AND of every outcome (true for an empty batch)
    pub all_succeeded: bool,
}

impl UploadReport {
    /// Build a report, computing the aggregate flag
    pub fn new(outcomes: Vec<UploadOutcome>) -> Self {
        let all_succeeded = outcomes.iter().all(|o| o.success);
        Self {
            outcomes,
            all_succeeded,
        }
    }

    /// Number of failed outcomes
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }

    /// First failure description, if any
    pub fn first_error(&self) -> Option<&str> {
        self.outcomes.iter().find_map(|o| o.error.as_deref())
    }
}

/// Event emitted during the job lifecycle
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Job accepted and registered as pending
    Submitted {
        /// Job ID
        id: JobId,
        /// Extracted URL
        url: String,
    },

    /// Job finished and every resource was uploaded
    Succeeded {
        /// Job ID
        id: JobId,
        /// Final label
        label: String,
        /// Number of uploaded resources
        resources: usize,
    },

    /// Job finished with a failure
    Failed {
        /// Job ID
        id: JobId,
        /// Final label
        label: String,
        /// Failure reason
        error: String,
    },

    /// Registry wiped by the janitor
    Cleared {
        /// Number of jobs removed
        removed: usize,
    },

    /// Relay is shutting down
    Shutdown,
}

impl Event {
    /// Stable name used as the SSE event type
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Submitted { .. } => "submitted",
            Event::Succeeded { .. } => "succeeded",
            Event::Failed { .. } => "failed",
            Event::Cleared { .. } => "cleared",
            Event::Shutdown => "shutdown",
        }
    }
}
