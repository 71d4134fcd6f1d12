//! Mock page fetcher for testing.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::PageFetcher;
use crate::error::{DmhyError, Result};

const MOCK_BASE_URL: &str = "https://dmhy.test";

/// Scripted implementation of [`PageFetcher`]
///
/// Pages are keyed by the page number in `/topics/list/page/{n}`. Pages
/// that were never scripted come back as an empty listing, so a search
/// against a fresh mock ends on page 1.
#[derive(Debug, Default)]
pub struct MockFetcher {
    pages: HashMap<u32, String>,
    failing: HashMap<u32, String>,
    requested: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for page `page`
    pub fn with_page(mut self, page: u32, html: impl Into<String>) -> Self {
        self.pages.insert(page, html.into());
        self
    }

    /// Fail requests for page `page` with an I/O error carrying `message`
    pub fn with_failure(mut self, page: u32, message: impl Into<String>) -> Self {
        self.failing.insert(page, message.into());
        self
    }

    /// URLs requested so far, in order
    pub fn requested_urls(&self) -> Vec<String> {
        self.requested
            .lock()
            .map(|urls| urls.clone())
            .unwrap_or_default()
    }

    fn page_number(url: &str) -> Option<u32> {
        let rest = url.split("/topics/list/page/").nth(1)?;
        rest.split('?').next()?.parse().ok()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if let Ok(mut urls) = self.requested.lock() {
            urls.push(url.to_string());
        }

        let page = Self::page_number(url).unwrap_or(0);
        if let Some(message) = self.failing.get(&page) {
            return Err(DmhyError::Io(std::io::Error::other(message.clone())));
        }

        Ok(self
            .pages
            .get(&page)
            .cloned()
            .unwrap_or_else(super::fixtures::empty_page)
            .into_bytes())
    }

    fn base_url(&self) -> &str {
        MOCK_BASE_URL
    }
}
