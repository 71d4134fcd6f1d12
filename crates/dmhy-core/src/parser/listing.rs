//! Listing page parser for dmhy.org
//!
//! Parses one page of `/topics/list` HTML into [`SearchResult`]s.
//!
//! Each row of the `#topic_list` table has the cells
//! `time | category | title | links | size | ...`. Any row missing one of
//! the fields we read is reported as `MalformedRow` and aborts the page.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DmhyError, Result};
use crate::parser::time::TimeFormat;
use crate::types::SearchResult;
use crate::url::extract_magnet;

const TIME_CELL: usize = 0;
const TITLE_CELL: usize = 2;
const LINK_CELL: usize = 3;
const SIZE_CELL: usize = 4;

/// Which anchor in the title cell holds the torrent title
///
/// The title cell may start with a release group tag link, so the title
/// is not always the only anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleRule {
    /// Text of the last anchor
    #[default]
    LastAnchor,
    /// Text of the second anchor, or the first when there is only one
    SecondAnchorOrFirst,
}

/// Per-session options for row extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingOptions {
    pub time_format: TimeFormat,
    pub title_rule: TitleRule,
}

struct ListingSelectors {
    rows: Selector,
    span: Selector,
    anchor: Selector,
    download: Selector,
}

impl ListingSelectors {
    fn new() -> Result<Self> {
        let parse = |css: &str| {
            Selector::parse(css)
                .map_err(|e| DmhyError::ParseError(format!("Invalid selector {}: {:?}", css, e)))
        };
        Ok(Self {
            rows: parse("table#topic_list > tbody > tr")?,
            span: parse("span")?,
            anchor: parse("a")?,
            download: parse(".download-pp")?,
        })
    }
}

/// Parses one listing page
///
/// # Arguments
/// * `html` - Raw page body
/// * `page` - Page number, used in error reports
/// * `options` - Time reformatting and title extraction rules
///
/// # Returns
/// `None` when the page has no `#topic_list` table or the table has no
/// rows, which marks the end of the results. Otherwise the rows in page
/// order.
///
/// # Errors
/// Returns `MalformedRow` for the first row that cannot be decoded
pub fn parse_listing(
    html: &[u8],
    page: u32,
    options: &ListingOptions,
) -> Result<Option<Vec<SearchResult>>> {
    let html = String::from_utf8_lossy(html);
    let document = Html::parse_document(&html);
    let selectors = ListingSelectors::new()?;

    let rows: Vec<ElementRef> = document.select(&selectors.rows).collect();
    if rows.is_empty() {
        return Ok(None);
    }

    let mut results = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let result = parse_row(row, &selectors, options)
            .map_err(|reason| DmhyError::malformed(page, idx + 1, reason))?;
        debug!(page, title = %result.title, "parsed listing row");
        results.push(result);
    }

    Ok(Some(results))
}

/// Decodes a single `<tr>`, returning the failure reason on error
fn parse_row(
    row: &ElementRef,
    selectors: &ListingSelectors,
    options: &ListingOptions,
) -> std::result::Result<SearchResult, String> {
    let cells: Vec<ElementRef> = row
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "td")
        .collect();

    let cell = |idx: usize, name: &str| {
        cells
            .get(idx)
            .ok_or_else(|| format!("missing {} cell (row has {} cells)", name, cells.len()))
    };

    let time = extract_time(cell(TIME_CELL, "time")?, selectors, options)?;
    let title = extract_title(cell(TITLE_CELL, "title")?, selectors, options.title_rule)?;
    let magnet = extract_download(cell(LINK_CELL, "link")?, selectors)?;
    let size = text_of(cell(SIZE_CELL, "size")?);

    Ok(SearchResult {
        time,
        title,
        size,
        magnet,
    })
}

fn extract_time(
    cell: &ElementRef,
    selectors: &ListingSelectors,
    options: &ListingOptions,
) -> std::result::Result<String, String> {
    let raw = cell
        .select(&selectors.span)
        .next()
        .map(|span| text_of(&span))
        .ok_or("time cell has no timestamp span")?;

    if options.time_format.is_native() {
        return Ok(raw);
    }

    options
        .time_format
        .reformat(&raw)
        .ok_or_else(|| format!("unparseable release time '{}'", raw))
}

fn extract_title(
    cell: &ElementRef,
    selectors: &ListingSelectors,
    rule: TitleRule,
) -> std::result::Result<String, String> {
    let anchors: Vec<ElementRef> = cell.select(&selectors.anchor).collect();
    let anchor = match rule {
        TitleRule::LastAnchor => anchors.last(),
        TitleRule::SecondAnchorOrFirst => anchors.get(1).or(anchors.first()),
    };

    anchor
        .map(text_of)
        .ok_or_else(|| "title cell has no anchor".to_string())
}

fn extract_download(
    cell: &ElementRef,
    selectors: &ListingSelectors,
) -> std::result::Result<String, String> {
    let href = cell
        .select(&selectors.download)
        .next()
        .ok_or("no download-pp link")?
        .value()
        .attr("href")
        .ok_or("download-pp link has no href")?;

    extract_magnet(href).ok_or_else(|| format!("download link '{}' has no url parameter", href))
}

fn text_of(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
