//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use assetform_lib::error::FetchError;
use assetform_lib::remote::OptionFetcher;
use async_trait::async_trait;

/// An in-process fetcher serving canned bodies by URL.
#[derive(Default)]
pub struct MockFetcher {
    bodies: HashMap<String, Result<serde_json::Value, FetchError>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, url: &str, body: serde_json::Value) -> Self {
        self.bodies.insert(url.to_string(), Ok(body));
        self
    }

    pub fn error(mut self, url: &str, error: FetchError) -> Self {
        self.bodies.insert(url.to_string(), Err(error));
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OptionFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.bodies
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::http(404, format!("no route for {url}"))))
    }
}
