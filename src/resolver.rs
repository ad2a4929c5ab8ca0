//! Resource resolution: which files a fetch produced and what they are called
//!
//! The fetch service writes media into the download directory under its own
//! names. The relay derives the storage-side names deterministically from the
//! post metadata:
//!
//! - image set: `<author>_<itemID>_<n>.<ext>`, one per non-empty link, `n` from 1
//! - video: `<author>_<itemID>.<ext>`, a single file however many links
//!
//! Video containers vary, so unless a fixed video extension is configured the
//! extension is taken from the downloaded file whose name contains the item id.

use crate::config::FetcherConfig;
use crate::error::ResolutionError;
use crate::types::{FetchResult, MediaKind, Resource};
use std::path::Path;

/// Extension rules for generated file names
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamingRules {
    /// Extension for image-set files
    pub image_extension: String,
    /// Fixed extension for video files; `None` scans the download directory
    pub video_extension: Option<String>,
}

impl NamingRules {
    /// Rules with a fixed image extension and video discovery
    pub fn new(image_extension: impl Into<String>) -> Self {
        Self {
            image_extension: normalize_extension(&image_extension.into()),
            video_extension: None,
        }
    }

    /// Use a fixed video extension instead of scanning the directory
    pub fn with_video_extension(mut self, extension: impl Into<String>) -> Self {
        self.video_extension = Some(normalize_extension(&extension.into()));
        self
    }
}

impl Default for NamingRules {
    fn default() -> Self {
        Self::new("jpeg")
    }
}

impl From<&FetcherConfig> for NamingRules {
    fn from(config: &FetcherConfig) -> Self {
        let rules = Self::new(config.image_extension.as_str());
        match &config.video_extension {
            Some(ext) => rules.with_video_extension(ext.as_str()),
            None => rules,
        }
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_string()
}

/// Resolve the files a fetch result produced in `dir`
///
/// The only I/O is the directory listing for video extension discovery, and
/// only when `rules` has no fixed video extension.
pub async fn resolve_resources(
    dir: &Path,
    fetched: &FetchResult,
    rules: &NamingRules,
) -> Result<Vec<Resource>, ResolutionError> {
    let extension = match &fetched.kind {
        MediaKind::ImageSet => rules.image_extension.clone(),
        MediaKind::Video => match &rules.video_extension {
            Some(ext) => ext.clone(),
            None => discover_video_extension(dir, &fetched.item_id).await?,
        },
        MediaKind::Other(tag) => {
            tracing::debug!(kind = %tag, item_id = %fetched.item_id, "unknown media kind, naming files without extension");
            String::new()
        }
    };

    let links = fetched.non_empty_links();
    let resources = match fetched.kind {
        MediaKind::Video => links
            .take(1)
            .map(|_| {
                let stem = format!("{}_{}", fetched.author, fetched.item_id);
                resource(dir, &stem, &extension)
            })
            .collect(),
        MediaKind::ImageSet | MediaKind::Other(_) => links
            .enumerate()
            .map(|(i, _)| {
                let stem = format!("{}_{}_{}", fetched.author, fetched.item_id, i + 1);
                resource(dir, &stem, &extension)
            })
            .collect(),
    };

    Ok(resources)
}

fn resource(dir: &Path, stem: &str, extension: &str) -> Resource {
    let file_name = if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{extension}")
    };
    Resource {
        file_path: dir.join(&file_name),
        file_name,
    }
}

/// Extension of the first file (by name) in `dir` whose name contains `item_id`
async fn discover_video_extension(dir: &Path, item_id: &str) -> Result<String, ResolutionError> {
    let unreadable = |source| ResolutionError::DirectoryUnreadable {
        dir: dir.to_path_buf(),
        source,
    };
    let no_match = || ResolutionError::NoMatchingFile {
        dir: dir.to_path_buf(),
        item_id: item_id.to_string(),
    };

    if item_id.is_empty() {
        return Err(no_match());
    }

    let mut entries = tokio::fs::read_dir(dir).await.map_err(unreadable)?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    names
        .iter()
        .filter(|name| name.contains(item_id))
        .find_map(|name| {
            Path::new(name)
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
        })
        .ok_or_else(no_match)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fetched(kind: MediaKind, links: &[&str]) -> FetchResult {
        FetchResult {
            author: "A".into(),
            title: "T".into(),
            download_links: links.iter().map(|l| l.to_string()).collect(),
            kind,
            item_id: "x123".into(),
        }
    }

    fn names(resources: &[Resource]) -> Vec<&str> {
        resources.iter().map(|r| r.file_name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_image_set_one_resource_per_link() {
        let dir = tempdir().unwrap();
        let result = fetched(
            MediaKind::ImageSet,
            &["https://cdn/1", "https://cdn/2", "https://cdn/3"],
        );

        let resources = resolve_resources(dir.path(), &result, &NamingRules::default())
            .await
            .unwrap();

        assert_eq!(
            names(&resources),
            ["A_x123_1.jpeg", "A_x123_2.jpeg", "A_x123_3.jpeg"]
        );
        assert_eq!(resources[0].file_path, dir.path().join("A_x123_1.jpeg"));
    }

    #[tokio::test]
    async fn test_image_set_skips_empty_links_without_consuming_index() {
        let dir = tempdir().unwrap();
        let result = fetched(MediaKind::ImageSet, &["", "https://cdn/1", "", "https://cdn/2"]);

        let resources = resolve_resources(dir.path(), &result, &NamingRules::default())
            .await
            .unwrap();

        assert_eq!(names(&resources), ["A_x123_1.jpeg", "A_x123_2.jpeg"]);
    }

    #[tokio::test]
    async fn test_image_set_does_not_touch_directory() {
        let missing = Path::new("/nonexistent/media-relay/download");
        let result = fetched(MediaKind::ImageSet, &["https://cdn/1"]);

        let resources = resolve_resources(missing, &result, &NamingRules::default())
            .await
            .unwrap();

        assert_eq!(resources.len(), 1);
    }

    #[tokio::test]
    async fn test_video_collapses_to_single_resource() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("A_x123.mp4"), b"video").unwrap();
        let result = fetched(
            MediaKind::Video,
            &["https://cdn/part1", "", "https://cdn/part2"],
        );

        let resources = resolve_resources(dir.path(), &result, &NamingRules::default())
            .await
            .unwrap();

        assert_eq!(names(&resources), ["A_x123.mp4"]);
        assert_eq!(resources[0].file_path, dir.path().join("A_x123.mp4"));
    }

    #[tokio::test]
    async fn test_video_extension_discovered_from_item_id() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("unrelated.mp4"), b"").unwrap();
        std::fs::write(dir.path().join("2024-01-01_A_x123.mov"), b"").unwrap();
        let result = fetched(MediaKind::Video, &["https://cdn/v"]);

        let resources = resolve_resources(dir.path(), &result, &NamingRules::default())
            .await
            .unwrap();

        assert_eq!(names(&resources), ["A_x123.mov"]);
    }

    #[tokio::test]
    async fn test_video_discovery_skips_files_without_extension() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("A_x123"), b"").unwrap();
        std::fs::write(dir.path().join("A_x123.webm"), b"").unwrap();
        let result = fetched(MediaKind::Video, &["https://cdn/v"]);

        let resources = resolve_resources(dir.path(), &result, &NamingRules::default())
            .await
            .unwrap();

        assert_eq!(names(&resources), ["A_x123.webm"]);
    }

    #[tokio::test]
    async fn test_video_without_matching_file_fails() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("other_y999.mp4"), b"").unwrap();
        let result = fetched(MediaKind::Video, &["https://cdn/v"]);

        let err = resolve_resources(dir.path(), &result, &NamingRules::default())
            .await
            .unwrap_err();

        match err {
            ResolutionError::NoMatchingFile { item_id, .. } => assert_eq!(item_id, "x123"),
            other => panic!("expected NoMatchingFile, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_video_with_unreadable_directory_fails() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        let result = fetched(MediaKind::Video, &["https://cdn/v"]);

        let err = resolve_resources(&missing, &result, &NamingRules::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ResolutionError::DirectoryUnreadable { .. }));
    }

    #[tokio::test]
    async fn test_fixed_video_extension_skips_scan() {
        let missing = Path::new("/nonexistent/media-relay/download");
        let rules = NamingRules::default().with_video_extension(".mp4");
        let result = fetched(MediaKind::Video, &["https://cdn/v"]);

        let resources = resolve_resources(missing, &result, &rules).await.unwrap();

        assert_eq!(names(&resources), ["A_x123.mp4"]);
    }

    #[tokio::test]
    async fn test_video_without_links_yields_nothing() {
        let rules = NamingRules::default().with_video_extension("mp4");
        let result = fetched(MediaKind::Video, &["", ""]);

        let resources = resolve_resources(Path::new("."), &result, &rules)
            .await
            .unwrap();

        assert!(resources.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_kind_names_without_extension() {
        let result = fetched(MediaKind::Other("直播".into()), &["https://cdn/1", "https://cdn/2"]);

        let resources = resolve_resources(Path::new("."), &result, &NamingRules::default())
            .await
            .unwrap();

        assert_eq!(names(&resources), ["A_x123_1", "A_x123_2"]);
    }

    #[tokio::test]
    async fn test_untagged_kind_names_without_extension() {
        let result = fetched(MediaKind::default(), &["https://cdn/1"]);

        let resources = resolve_resources(Path::new("."), &result, &NamingRules::default())
            .await
            .unwrap();

        assert_eq!(names(&resources), ["A_x123_1"]);
    }

    #[test]
    fn test_naming_rules_from_config() {
        let mut config = FetcherConfig {
            image_extension: ".png".into(),
            ..Default::default()
        };
        assert_eq!(NamingRules::from(&config), NamingRules::new("png"));

        config.video_extension = Some("mp4".into());
        assert_eq!(
            NamingRules::from(&config).video_extension.as_deref(),
            Some("mp4")
        );
    }
}
