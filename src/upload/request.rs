//! Upload request metadata.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Category id for "Gaming" on YouTube.
pub const GAMING_CATEGORY_ID: &str = "20";

/// Privacy status of an uploaded video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    Public,
    #[default]
    Private,
    Unlisted,
}

/// Everything the upload engine needs to know about one video.
///
/// Immutable once constructed; owned by the upload invocation that created it.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Local file to upload.
    pub file_path: PathBuf,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
    pub privacy_status: PrivacyStatus,
    pub made_for_kids: bool,
}

impl UploadRequest {
    /// Build a request with the defaults used for session VODs.
    pub fn new(file_path: PathBuf, title: String) -> Self {
        Self {
            file_path,
            title,
            description: String::new(),
            tags: Vec::new(),
            category_id: GAMING_CATEGORY_ID.to_string(),
            privacy_status: PrivacyStatus::default(),
            made_for_kids: false,
        }
    }

    /// The `videos.insert` metadata body sent when initializing the upload.
    pub fn metadata(&self) -> VideoResource<'_> {
        VideoResource {
            snippet: Snippet {
                title: &self.title,
                description: &self.description,
                tags: &self.tags,
                category_id: &self.category_id,
            },
            status: Status {
                privacy_status: self.privacy_status,
                self_declared_made_for_kids: self.made_for_kids,
            },
        }
    }
}

/// `snippet`/`status` parts of the video resource.
#[derive(Debug, Serialize)]
pub struct VideoResource<'a> {
    pub snippet: Snippet<'a>,
    pub status: Status,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub tags: &'a [String],
    pub category_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub privacy_status: PrivacyStatus,
    pub self_declared_made_for_kids: bool,
}

/// Identifier of a successfully uploaded video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoId(pub String);

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_body_shape() {
        let request = UploadRequest::new(
            PathBuf::from("downloaded/007.mp4"),
            "Nethackathon VI: 13-alpha".to_string(),
        );

        let body = serde_json::to_value(request.metadata()).unwrap();
        assert_eq!(body["snippet"]["title"], "Nethackathon VI: 13-alpha");
        assert_eq!(body["snippet"]["categoryId"], "20");
        assert_eq!(body["status"]["privacyStatus"], "private");
        assert_eq!(body["status"]["selfDeclaredMadeForKids"], false);
    }

    #[test]
    fn test_tags_serialized_in_order() {
        let mut request = UploadRequest::new(PathBuf::from("v.mp4"), "t".to_string());
        request.tags = vec!["nethack".to_string(), "charity".to_string()];

        let body = serde_json::to_value(request.metadata()).unwrap();
        assert_eq!(
            body["snippet"]["tags"],
            serde_json::json!(["nethack", "charity"])
        );
    }
}
