//! Search session for dmhy.org
//!
//! A [`SearchSession`] walks the paginated listing for a query, keeps the
//! collected results and lets the caller pick one of them for size
//! reformatting or saving.
//!
//! ```text
//!            search()                 ok / error
//!   Idle ───────────────▶ Fetching ───────────────▶ Idle
//!   Selected ───────────▶
//!   Idle ── select() ───▶ Selected ── select() ───▶ Selected
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{Instrument, info, info_span, warn};

use crate::client::{ClientConfig, DmhyClient, PageFetcher};
use crate::error::{DmhyError, Result};
use crate::parser::{ListingOptions, TimeFormat, TitleRule, parse_listing};
use crate::persist::{CsvLayout, append_row};
use crate::size::{ByteUnit, convert_byte, parse_size};
use crate::types::{SearchQuery, SearchResult, SearchSummary, StopReason};
use crate::url::{build_page_url, build_query_string};

/// Category ids accepted by the site's `sort_id` parameter
pub const AVAILABLE_SORT_IDS: [u32; 20] = [
    0, 2, 31, 3, 41, 42, 4, 43, 44, 15, 6, 7, 9, 17, 18, 19, 20, 21, 12, 1,
];

/// Configuration for a search session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Pattern release times are rendered with (default: site format)
    pub time_format: TimeFormat,
    /// Highest page number a search will request (default: 999)
    pub max_pages: u32,
    /// Which title cell anchor holds the title
    pub title_rule: TitleRule,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::default(),
            max_pages: 999,
            title_rule: TitleRule::default(),
        }
    }
}

/// Where a session is in its search/select cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No selection; results of the last search (if any) are available
    Idle,
    /// A search is running, or its future was dropped before finishing
    Fetching,
    /// One result is selected
    Selected,
}

/// Paginated search over dmhy.org listings
///
/// Results are replaced wholesale by every call to [`search`](Self::search).
/// Sessions share nothing, so independent searches need independent
/// sessions.
pub struct SearchSession<F = DmhyClient> {
    fetcher: F,
    options: ListingOptions,
    max_pages: u32,
    results: Vec<SearchResult>,
    selected: Option<SearchResult>,
    state: SessionState,
}

impl SearchSession<DmhyClient> {
    /// Create a session backed by a [`DmhyClient`]
    ///
    /// # Errors
    /// - `InvalidConfig` if `max_pages` is 0
    /// - `InvalidProxy` / `Network` if the HTTP client cannot be built
    pub fn new(client: ClientConfig, config: SessionConfig) -> Result<Self> {
        Self::with_fetcher(DmhyClient::with_config(client)?, config)
    }
}

impl<F: PageFetcher> SearchSession<F> {
    /// Create a session that pulls pages through `fetcher`
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `max_pages` is 0
    pub fn with_fetcher(fetcher: F, config: SessionConfig) -> Result<Self> {
        if config.max_pages == 0 {
            return Err(DmhyError::InvalidConfig(
                "max_pages must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            fetcher,
            options: ListingOptions {
                time_format: config.time_format,
                title_rule: config.title_rule,
            },
            max_pages: config.max_pages,
            results: Vec::new(),
            selected: None,
            state: SessionState::Idle,
        })
    }

    /// Run a search, replacing any previous results and selection
    ///
    /// Pages are requested one at a time from page 1 until a page has no
    /// listing or `max_pages` is reached. The results are kept only if
    /// every page was fetched and parsed.
    ///
    /// # Errors
    /// - `InvalidSortId` if `query.sort_id` is not in [`AVAILABLE_SORT_IDS`];
    ///   nothing is requested and the session is left untouched
    /// - `MalformedRow` if any row on any page cannot be decoded
    /// - `Network` (or the fetcher's own error) if a request fails
    pub async fn search(&mut self, query: &SearchQuery) -> Result<SearchSummary> {
        if !AVAILABLE_SORT_IDS.contains(&query.sort_id) {
            return Err(DmhyError::InvalidSortId(query.sort_id));
        }

        self.results.clear();
        self.selected = None;
        self.state = SessionState::Fetching;

        let span = info_span!("search", keyword = %query.keyword, sort_id = query.sort_id);
        let outcome = self.collect_pages(query).instrument(span).await;
        self.state = SessionState::Idle;

        let (results, summary) = outcome?;
        self.results = results;
        info!(
            keyword = %query.keyword,
            results = summary.results,
            pages = summary.pages_fetched,
            "This search is complete"
        );
        Ok(summary)
    }

    async fn collect_pages(
        &self,
        query: &SearchQuery,
    ) -> Result<(Vec<SearchResult>, SearchSummary)> {
        let query_string = build_query_string(query);
        let mut results = Vec::new();

        for page in 1..=self.max_pages {
            let url = build_page_url(self.fetcher.base_url(), page, &query_string);
            let html = self.fetcher.fetch(&url).await?;

            match parse_listing(&html, page, &self.options)? {
                Some(rows) => results.extend(rows),
                None => {
                    let summary = SearchSummary {
                        results: results.len(),
                        pages_fetched: page,
                        stop: StopReason::Exhausted,
                    };
                    return Ok((results, summary));
                }
            }
        }

        warn!(
            max_pages = self.max_pages,
            "page limit reached before the listing ran out"
        );
        let summary = SearchSummary {
            results: results.len(),
            pages_fetched: self.max_pages,
            stop: StopReason::PageLimit,
        };
        Ok((results, summary))
    }

    /// Choose the result at `index` (0-based)
    ///
    /// # Errors
    /// Returns `IndexOutOfRange` without changing the session if `index`
    /// is past the end of the results
    pub fn select(&mut self, index: usize) -> Result<&SearchResult> {
        let result = self
            .results
            .get(index)
            .ok_or(DmhyError::IndexOutOfRange {
                index,
                len: self.results.len(),
            })?;

        self.state = SessionState::Selected;
        Ok(&*self.selected.insert(result.clone()))
    }

    /// Rewrite the selected result's size in `unit`
    ///
    /// The size becomes `"{value}{unit}"` (e.g., `"1.46GB"`). A size already
    /// in `unit` is left as it is.
    ///
    /// # Errors
    /// - `NotSelected` if nothing is selected
    /// - `InvalidUnit` if either unit is unknown
    /// - `InvalidSizeFormat` if the size label cannot be parsed
    pub fn format_selected_size(&mut self, unit: &str) -> Result<&SearchResult> {
        let selected = self.selected.as_mut().ok_or(DmhyError::NotSelected)?;

        let target: ByteUnit = unit.parse()?;
        let (value, from_unit) = parse_size(&selected.size)?;
        if !from_unit.eq_ignore_ascii_case(target.as_str()) {
            let converted = convert_byte(value, &from_unit, unit)?;
            selected.size = format!("{}{}", converted, unit);
        }

        Ok(&*selected)
    }

    /// Append the selected result to the CSV file at `path`
    ///
    /// # Errors
    /// - `NotSelected` if nothing is selected
    /// - `Io` / `Persist` if the file cannot be written
    pub fn persist(&self, path: impl AsRef<Path>, layout: CsvLayout) -> Result<()> {
        let selected = self.selected.as_ref().ok_or(DmhyError::NotSelected)?;
        append_row(path.as_ref(), selected, layout)
    }

    /// Results of the last successful search, in listing order
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The selected result, including any size reformatting
    pub fn selected(&self) -> Option<&SearchResult> {
        self.selected.as_ref()
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockFetcher, fixtures};

    fn session(fetcher: MockFetcher) -> SearchSession<MockFetcher> {
        SearchSession::with_fetcher(fetcher, SessionConfig::default()).unwrap()
    }

    fn single_row_page(title: &str, size: &str) -> String {
        fixtures::listing_page(&[fixtures::listing_row(
            "2024/05/01 12:30",
            &format!("<a>{}</a>", title),
            &fixtures::pikpak_href(&format!("magnet:?xt=urn:btih:{}", title)),
            size,
        )])
    }

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert!(config.time_format.is_native());
        assert_eq!(config.max_pages, 999);
        assert_eq!(config.title_rule, TitleRule::LastAnchor);
    }

    #[test]
    fn test_session_rejects_zero_max_pages() {
        let config = SessionConfig {
            max_pages: 0,
            ..SessionConfig::default()
        };
        let result = SearchSession::with_fetcher(MockFetcher::new(), config);
        assert!(matches!(result, Err(DmhyError::InvalidConfig(_))));
    }

    #[test]
    fn test_new_session_is_idle_and_empty() {
        let session = session(MockFetcher::new());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.is_empty());
        assert!(session.selected().is_none());
    }

    #[tokio::test]
    async fn test_search_invalid_sort_id_makes_no_request() {
        let mut session = session(MockFetcher::new());
        let query = SearchQuery::new("frieren").sort_id(5);

        match session.search(&query).await {
            Err(DmhyError::InvalidSortId(id)) => assert_eq!(id, 5),
            other => panic!("Expected InvalidSortId, got {:?}", other),
        }
        assert!(session.fetcher().requested_urls().is_empty());
    }

    #[tokio::test]
    async fn test_search_invalid_sort_id_keeps_selection() {
        let fetcher = MockFetcher::new().with_page(1, fixtures::numbered_page("A", 2));
        let mut session = session(fetcher);
        session.search(&SearchQuery::new("a")).await.unwrap();
        session.select(1).unwrap();

        let err = session.search(&SearchQuery::new("a").sort_id(99)).await;
        assert!(err.is_err());
        assert_eq!(session.state(), SessionState::Selected);
        assert_eq!(session.len(), 2);
    }

    #[tokio::test]
    async fn test_search_empty_first_page() {
        let mut session = session(MockFetcher::new());
        let summary = session.search(&SearchQuery::new("nothing")).await.unwrap();

        assert_eq!(summary.results, 0);
        assert_eq!(summary.pages_fetched, 1);
        assert_eq!(summary.stop, StopReason::Exhausted);
        assert!(session.is_empty());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_search_walks_pages_in_order() {
        let fetcher = MockFetcher::new()
            .with_page(1, fixtures::numbered_page("A", 3))
            .with_page(2, fixtures::numbered_page("B", 2));
        let mut session = session(fetcher);

        let query = SearchQuery::new("spy family").sort_id(2).team_id(117);
        let summary = session.search(&query).await.unwrap();

        assert_eq!(summary.results, 5);
        assert_eq!(summary.pages_fetched, 3);
        assert_eq!(summary.stop, StopReason::Exhausted);

        let titles: Vec<&str> = session.results().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A 1", "A 2", "A 3", "B 1", "B 2"]);

        let urls = session.fetcher().requested_urls();
        assert_eq!(
            urls,
            vec![
                "https://dmhy.test/topics/list/page/1?keyword=spy%20family&sort_id=2&team_id=117&order=date-desc",
                "https://dmhy.test/topics/list/page/2?keyword=spy%20family&sort_id=2&team_id=117&order=date-desc",
                "https://dmhy.test/topics/list/page/3?keyword=spy%20family&sort_id=2&team_id=117&order=date-desc",
            ]
        );
    }

    #[tokio::test]
    async fn test_search_stops_at_page_limit() {
        let fetcher = MockFetcher::new()
            .with_page(1, fixtures::numbered_page("A", 1))
            .with_page(2, fixtures::numbered_page("B", 1))
            .with_page(3, fixtures::numbered_page("C", 1));
        let config = SessionConfig {
            max_pages: 2,
            ..SessionConfig::default()
        };
        let mut session = SearchSession::with_fetcher(fetcher, config).unwrap();

        let summary = session.search(&SearchQuery::new("a")).await.unwrap();
        assert_eq!(summary.stop, StopReason::PageLimit);
        assert_eq!(summary.pages_fetched, 2);
        assert_eq!(session.len(), 2);
        assert_eq!(session.fetcher().requested_urls().len(), 2);
    }

    #[tokio::test]
    async fn test_search_fetch_failure_discards_partial_results() {
        let fetcher = MockFetcher::new()
            .with_page(1, fixtures::numbered_page("A", 3))
            .with_failure(2, "connection reset");
        let mut session = session(fetcher);

        let err = session.search(&SearchQuery::new("a")).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
        assert!(session.is_empty());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_search_malformed_row_aborts_search() {
        let broken = fixtures::listing_page(&[fixtures::listing_row(
            "2024/05/01 12:30",
            "no anchor here",
            &fixtures::pikpak_href("magnet:?x"),
            "1MB",
        )]);
        let fetcher = MockFetcher::new()
            .with_page(1, fixtures::numbered_page("A", 2))
            .with_page(2, broken);
        let mut session = session(fetcher);

        match session.search(&SearchQuery::new("a")).await {
            Err(DmhyError::MalformedRow { page, row, .. }) => {
                assert_eq!(page, 2);
                assert_eq!(row, 1);
            }
            other => panic!("Expected MalformedRow, got {:?}", other),
        }
        assert!(session.is_empty());
        // no request past the broken page
        assert_eq!(session.fetcher().requested_urls().len(), 2);
    }

    #[tokio::test]
    async fn test_search_resets_previous_results_and_selection() {
        let fetcher = MockFetcher::new().with_page(1, fixtures::numbered_page("A", 3));
        let mut session = session(fetcher);

        session.search(&SearchQuery::new("first")).await.unwrap();
        session.select(2).unwrap();
        assert_eq!(session.state(), SessionState::Selected);
        let first: Vec<SearchResult> = session.results().to_vec();

        // same pages, so identical content must not have been appended twice
        session.search(&SearchQuery::new("second")).await.unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.selected().is_none());
        assert_eq!(session.results(), first.as_slice());
        assert_eq!(session.len(), 3);
    }

    #[tokio::test]
    async fn test_search_replaces_results_with_new_content() {
        let mut session = session(MockFetcher::new().with_page(1, fixtures::numbered_page("A", 2)));
        session.search(&SearchQuery::new("a")).await.unwrap();
        assert_eq!(session.len(), 2);

        session.fetcher = MockFetcher::new().with_page(1, fixtures::numbered_page("Z", 1));
        session.search(&SearchQuery::new("z")).await.unwrap();

        assert_eq!(session.len(), 1);
        assert_eq!(session.results()[0].title, "Z 1");
    }

    #[tokio::test]
    async fn test_select_copies_result() {
        let mut session = session(MockFetcher::new().with_page(1, fixtures::numbered_page("A", 3)));
        session.search(&SearchQuery::new("a")).await.unwrap();

        let selected = session.select(1).unwrap().clone();
        assert_eq!(selected.title, "A 2");
        assert_eq!(selected.magnet, "magnet:?xt=urn:btih:A2");
        assert_eq!(session.selected(), Some(&selected));
        assert_eq!(session.state(), SessionState::Selected);
    }

    #[tokio::test]
    async fn test_select_out_of_range_keeps_state() {
        let mut session = session(MockFetcher::new().with_page(1, fixtures::numbered_page("A", 2)));
        session.search(&SearchQuery::new("a")).await.unwrap();

        match session.select(2) {
            Err(DmhyError::IndexOutOfRange { index, len }) => {
                assert_eq!(index, 2);
                assert_eq!(len, 2);
            }
            other => panic!("Expected IndexOutOfRange, got {:?}", other),
        }
        assert_eq!(session.state(), SessionState::Idle);

        session.select(0).unwrap();
        assert!(session.select(5).is_err());
        assert_eq!(session.state(), SessionState::Selected);
        assert_eq!(session.selected().unwrap().title, "A 1");
    }

    #[test]
    fn test_select_on_fresh_session() {
        let mut session = session(MockFetcher::new());
        assert!(matches!(
            session.select(0),
            Err(DmhyError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_not_selected_on_fresh_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(MockFetcher::new());

        assert!(matches!(
            session.format_selected_size("MB"),
            Err(DmhyError::NotSelected)
        ));
        assert!(matches!(
            session.persist(dir.path().join("out.csv"), CsvLayout::Full),
            Err(DmhyError::NotSelected)
        ));
        assert!(!dir.path().join("out.csv").exists());
    }

    #[tokio::test]
    async fn test_not_selected_after_search() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(MockFetcher::new().with_page(1, fixtures::numbered_page("A", 2)));
        session.search(&SearchQuery::new("a")).await.unwrap();

        assert!(matches!(
            session.format_selected_size("GB"),
            Err(DmhyError::NotSelected)
        ));
        assert!(matches!(
            session.persist(dir.path().join("out.csv"), CsvLayout::Full),
            Err(DmhyError::NotSelected)
        ));
    }

    #[tokio::test]
    async fn test_format_selected_size() {
        let mut session = session(MockFetcher::new().with_page(1, single_row_page("Show", "1.5 GB")));
        session.search(&SearchQuery::new("a")).await.unwrap();
        session.select(0).unwrap();

        let formatted = session.format_selected_size("MB").unwrap();
        assert_eq!(formatted.size, "1536MB");
        // the listing itself is untouched
        assert_eq!(session.results()[0].size, "1.5 GB");
    }

    #[tokio::test]
    async fn test_format_selected_size_same_unit_is_noop() {
        let mut session = session(MockFetcher::new().with_page(1, single_row_page("Show", "700 MB")));
        session.search(&SearchQuery::new("a")).await.unwrap();
        session.select(0).unwrap();

        assert_eq!(session.format_selected_size("mb").unwrap().size, "700 MB");
    }

    #[tokio::test]
    async fn test_format_selected_size_rounds() {
        let mut session = session(MockFetcher::new().with_page(1, single_row_page("Show", "1000MB")));
        session.search(&SearchQuery::new("a")).await.unwrap();
        session.select(0).unwrap();

        assert_eq!(session.format_selected_size("GB").unwrap().size, "0.98GB");
    }

    #[tokio::test]
    async fn test_format_selected_size_errors() {
        let mut session = session(MockFetcher::new().with_page(1, single_row_page("Show", "2 PB")));
        session.search(&SearchQuery::new("a")).await.unwrap();
        session.select(0).unwrap();

        assert!(matches!(
            session.format_selected_size("XB"),
            Err(DmhyError::InvalidUnit(u)) if u == "XB"
        ));
        assert!(matches!(
            session.format_selected_size("GB"),
            Err(DmhyError::InvalidUnit(u)) if u == "PB"
        ));
        assert_eq!(session.selected().unwrap().size, "2 PB");
    }

    #[tokio::test]
    async fn test_format_selected_size_unparseable_label() {
        let mut session = session(MockFetcher::new().with_page(1, single_row_page("Show", "unknown")));
        session.search(&SearchQuery::new("a")).await.unwrap();
        session.select(0).unwrap();

        assert!(matches!(
            session.format_selected_size("GB"),
            Err(DmhyError::InvalidSizeFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_persist_selected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.csv");
        let mut session = session(MockFetcher::new().with_page(1, single_row_page("Show", "1.5GB")));
        session.search(&SearchQuery::new("a")).await.unwrap();
        session.select(0).unwrap();
        session.format_selected_size("MB").unwrap();

        session.persist(&path, CsvLayout::Full).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "time,title,size,magnet\r\n2024/05/01 12:30,Show,1536MB,magnet:?xt=urn:btih:Show\r\n"
        );
    }
}
