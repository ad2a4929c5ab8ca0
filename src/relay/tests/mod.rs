use super::test_helpers::{
    TestRelay, create_test_relay, image_post, test_config, video_post, wait_for_terminal,
};
use super::*;
use crate::error::Error;
use crate::types::JobStatus;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method};
use wiremock::{Mock, ResponseTemplate};
