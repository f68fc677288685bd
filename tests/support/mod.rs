//! Shared helpers for the integration tests.

#![allow(dead_code)]

use mockito::{Matcher, Mock, ServerGuard};
use std::path::PathBuf;

pub const TEST_KEY: &str = "test-key-123";

/// Path to a file under `tests/data`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

pub fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).expect("fixture should exist")
}

/// A JSON mock that also insists on the API key header.
pub fn json_mock(server: &mut ServerGuard, method: &str, path: &str, status: usize, body: &str) -> Mock {
    server
        .mock(method, path)
        .match_header("x-api-key", TEST_KEY)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create()
}

/// Catch-all mocks used to prove a command never reached the network.
pub fn no_requests(server: &mut ServerGuard) -> Vec<Mock> {
    ["GET", "POST"]
        .iter()
        .map(|method| server.mock(method, Matcher::Any).expect(0).create())
        .collect()
}
