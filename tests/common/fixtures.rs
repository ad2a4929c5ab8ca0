//! Mock services and post fixtures

use media_relay::{Config, MediaRelay};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the mock fetch service answers on
pub const FETCH_PATH: &str = "/xhs/detail";

/// Path the mock storage backend answers on
pub const STORAGE_PATH: &str = "/api/fs/put";

/// A relay wired to mock fetch and storage services
pub struct TestEnv {
    pub relay: Arc<MediaRelay>,
    pub fetch: MockServer,
    pub storage: MockServer,
    pub download_dir: TempDir,
}

impl TestEnv {
    /// Start mock services and a relay with default settings
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    /// Start mock services and a relay, letting the caller adjust the config
    pub async fn start_with(adjust: impl FnOnce(&mut Config)) -> Self {
        let fetch = MockServer::start().await;
        let storage = MockServer::start().await;
        let download_dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = Config::default();
        config.fetcher.url = format!("{}{FETCH_PATH}", fetch.uri());
        config.fetcher.download_dir = download_dir.path().to_path_buf();
        config.storage.url = format!("{}{STORAGE_PATH}", storage.uri());
        config.storage.token = "integration-token".into();
        config.storage.upload_path = "/relay/".into();
        config.server.shutdown_grace = Duration::from_secs(5);
        adjust(&mut config);

        let relay = MediaRelay::new(config).expect("Failed to create relay");

        Self {
            relay: Arc::new(relay),
            fetch,
            storage,
            download_dir,
        }
    }

    /// Answer fetches with `data` as the post metadata
    pub async fn serve_post(&self, data: Value) {
        Mock::given(method("POST"))
            .and(path(FETCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "获取作品信息成功",
                "data": data
            })))
            .mount(&self.fetch)
            .await;
    }

    /// Accept every upload and report a queued task
    pub async fn accept_uploads(&self) {
        Mock::given(method("PUT"))
            .and(path(STORAGE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "message": "success",
                "data": {"task": {"id": "queued"}}
            })))
            .mount(&self.storage)
            .await;
    }

    /// Place a file in the download directory as the fetch service would
    pub fn downloaded(&self, name: &str, content: &[u8]) {
        std::fs::write(self.download_dir.path().join(name), content)
            .expect("Failed to write downloaded file");
    }
}

/// Post metadata for a video
pub fn video_post(author: &str, title: &str, item_id: &str) -> Value {
    json!({
        "作者昵称": author,
        "作品标题": title,
        "下载地址": [format!("https://cdn.example/{item_id}.mp4")],
        "作品类型": "视频",
        "作品ID": item_id
    })
}

/// Post metadata for an image set
pub fn image_post(author: &str, title: &str, item_id: &str, count: usize) -> Value {
    let links: Vec<String> = (1..=count)
        .map(|n| format!("https://cdn.example/{item_id}/{n}.jpeg"))
        .collect();
    json!({
        "作者昵称": author,
        "作品标题": title,
        "下载地址": links,
        "作品类型": "图文",
        "作品ID": item_id
    })
}
