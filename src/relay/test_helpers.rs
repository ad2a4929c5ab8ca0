//! Shared test helpers for creating MediaRelay instances in tests.

use crate::config::Config;
use crate::relay::MediaRelay;
use crate::types::{Job, JobId};
use serde_json::{Value, json};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A relay wired to mock fetch and storage services.
/// The tempdir is the download directory and must be kept alive.
pub(crate) struct TestRelay {
    pub(crate) relay: MediaRelay,
    pub(crate) fetch_server: MockServer,
    pub(crate) storage_server: MockServer,
    pub(crate) download_dir: TempDir,
}

/// Config pointing at the given mock services and download directory
pub(crate) fn test_config(fetch: &MockServer, storage: &MockServer, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.fetcher.url = format!("{}/xhs/detail", fetch.uri());
    config.fetcher.download_dir = dir.path().to_path_buf();
    config.storage.url = format!("{}/api/fs/put", storage.uri());
    config.storage.token = "test-token".into();
    config.server.shutdown_grace = Duration::from_secs(5);
    config
}

/// Helper to create a relay with fresh mock services and an empty download directory.
pub(crate) async fn create_test_relay() -> TestRelay {
    let fetch_server = MockServer::start().await;
    let storage_server = MockServer::start().await;
    let download_dir = tempfile::tempdir().unwrap();

    let config = test_config(&fetch_server, &storage_server, &download_dir);
    let relay = MediaRelay::new(config).unwrap();

    TestRelay {
        relay,
        fetch_server,
        storage_server,
        download_dir,
    }
}

impl TestRelay {
    /// Answer every fetch with `data` as the post metadata
    pub(crate) async fn mount_fetch(&self, data: Value) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "获取作品信息成功",
                "data": data
            })))
            .mount(&self.fetch_server)
            .await;
    }

    /// Accept every upload
    pub(crate) async fn mount_storage_ok(&self) {
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "message": "success",
                "data": {"task": {"id": "task-1"}}
            })))
            .mount(&self.storage_server)
            .await;
    }

    /// Create a downloaded file in the download directory
    pub(crate) fn write_download(&self, name: &str, content: &[u8]) {
        std::fs::write(self.download_dir.path().join(name), content).unwrap();
    }
}

/// Post metadata for a single video by author `A` titled `T`
pub(crate) fn video_post(item_id: &str) -> Value {
    json!({
        "作者昵称": "A",
        "作品标题": "T",
        "下载地址": ["https://cdn.example/v.mp4"],
        "作品类型": "视频",
        "作品ID": item_id
    })
}

/// Post metadata for an image set with `count` images
pub(crate) fn image_post(item_id: &str, count: usize) -> Value {
    let links: Vec<String> = (1..=count)
        .map(|n| format!("https://cdn.example/{n}.jpeg"))
        .collect();
    json!({
        "作者昵称": "A",
        "作品标题": "T",
        "下载地址": links,
        "作品类型": "图文",
        "作品ID": item_id
    })
}

/// Poll the registry until job `id` reaches a terminal status
pub(crate) async fn wait_for_terminal(relay: &MediaRelay, id: JobId) -> Job {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        if let Some(job) = relay.job(id)
            && job.status.is_terminal()
        {
            return job;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job {id} did not finish in time"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
