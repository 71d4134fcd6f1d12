//! Testing utilities: a scripted page fetcher and listing fixtures.
//!
//! # Example
//!
//! ```
//! use dmhy_core::testing::{MockFetcher, fixtures};
//!
//! let fetcher = MockFetcher::new().with_page(
//!     1,
//!     fixtures::listing_page(&[fixtures::listing_row(
//!         "2024/05/01 12:30",
//!         "<a>Show - 01</a>",
//!         &fixtures::pikpak_href("magnet:?xt=urn:btih:AAA"),
//!         "1.5GB",
//!     )]),
//! );
//! assert_eq!(fetcher.requested_urls().len(), 0);
//! ```

mod mock_fetcher;

pub use mock_fetcher::MockFetcher;

/// Listing markup shaped like the site's `/topics/list` pages.
pub mod fixtures {
    /// One `<tr>` of the results table
    ///
    /// `title_cell` is inserted verbatim into the title `<td>`.
    pub fn listing_row(time: &str, title_cell: &str, download_href: &str, size: &str) -> String {
        format!(
            r#"<tr>
                <td width="98">今天 12:30<span style="display: none;">{time}</span></td>
                <td><a class="sort-2" href="/topics/list/sort_id/2">動畫</a></td>
                <td class="title">{title_cell}</td>
                <td nowrap="nowrap" align="center">
                    <a class="download-arrow arrow-magnet" href="magnet:?xt=urn:btih:IGNORED">&nbsp;</a>
                    <a class="download-pp" href="{download_href}">PikPak</a>
                </td>
                <td nowrap="nowrap" align="center">{size}</td>
                <td nowrap="nowrap" align="center"><span class="btl_1">12</span></td>
            </tr>"#
        )
    }

    /// A full page wrapping `rows` in the `#topic_list` table
    pub fn listing_page(rows: &[String]) -> String {
        format!(
            r#"<html><body><div class="table">
            <table class="tablesorter" id="topic_list">
                <thead><tr><th>發佈時間</th><th>分類</th><th>標題</th><th>磁鏈</th><th>大小</th></tr></thead>
                <tbody>{}</tbody>
            </table></div></body></html>"#,
            rows.join("\n")
        )
    }

    /// A page past the last result: no `#topic_list` table at all
    pub fn empty_page() -> String {
        r#"<html><body><div class="table"><div class="nav_title">沒有可顯示資源</div></div></body></html>"#
            .to_string()
    }

    /// PikPak download link carrying `magnet` in its `url` parameter
    pub fn pikpak_href(magnet: &str) -> String {
        format!(
            "https://mypikpak.com/drive/url-checker?url={}",
            urlencoding::encode(magnet)
        )
    }

    /// A page of `count` well-formed rows with titles `"{prefix} {n}"`
    pub fn numbered_page(prefix: &str, count: usize) -> String {
        let rows: Vec<String> = (1..=count)
            .map(|n| {
                listing_row(
                    "2024/05/01 12:30",
                    &format!("<a>{} {}</a>", prefix, n),
                    &pikpak_href(&format!("magnet:?xt=urn:btih:{}{}", prefix, n)),
                    &format!("{}00MB", n),
                )
            })
            .collect();
        listing_page(&rows)
    }
}
