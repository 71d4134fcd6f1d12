//! URL helper functions for dmhy.org
//!
//! Provides functions for building listing URLs and for pulling the
//! magnet URI out of a download link.

use crate::types::SearchQuery;

/// Default site root
pub const BASE_URL: &str = "https://dmhy.org";

/// Builds the query string for a search
///
/// Keys are always emitted in the order `keyword`, `sort_id`, `team_id`,
/// `order`, with values percent-encoded.
///
/// # Example
/// ```
/// use dmhy_core::{SearchQuery, url::build_query_string};
/// let qs = build_query_string(&SearchQuery::new("spy family"));
/// assert_eq!(qs, "keyword=spy%20family&sort_id=0&team_id=0&order=date-desc");
/// ```
pub fn build_query_string(query: &SearchQuery) -> String {
    format!(
        "keyword={}&sort_id={}&team_id={}&order={}",
        urlencoding::encode(&query.keyword),
        query.sort_id,
        query.team_id,
        urlencoding::encode(&query.order),
    )
}

/// Builds the listing URL for one page of results
///
/// # Arguments
/// * `base_url` - Site root without trailing slash (e.g., [`BASE_URL`])
/// * `page` - 1-based page number
/// * `query_string` - Output of [`build_query_string`]
///
/// # Example
/// ```
/// use dmhy_core::url::build_page_url;
/// let url = build_page_url("https://dmhy.org", 3, "keyword=a");
/// assert_eq!(url, "https://dmhy.org/topics/list/page/3?keyword=a");
/// ```
pub fn build_page_url(base_url: &str, page: u32, query_string: &str) -> String {
    format!(
        "{}/topics/list/page/{}?{}",
        base_url.trim_end_matches('/'),
        page,
        query_string
    )
}

/// Extracts the magnet URI from a download link
///
/// The link carries the magnet in its query string under the `url` key.
/// Keys and values are form-decoded (`+` is a space, `%XX` escapes are
/// expanded) before the key is compared.
///
/// # Returns
/// `Some(magnet)` for the first `url` parameter, `None` if there is none
///
/// # Example
/// ```
/// use dmhy_core::url::extract_magnet;
/// let href = "https://mypikpak.com/drive/url-checker?url=magnet:%3Fxt%3Durn:btih:ABC";
/// assert_eq!(extract_magnet(href), Some("magnet:?xt=urn:btih:ABC".to_string()));
/// ```
pub fn extract_magnet(href: &str) -> Option<String> {
    let query = href.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or(query);

    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if form_decode(key)? != "url" {
            return None;
        }
        form_decode(value)
    })
}

fn form_decode(component: &str) -> Option<String> {
    let component = component.replace('+', " ");
    urlencoding::decode(&component).ok().map(|v| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_string_defaults() {
        let qs = build_query_string(&SearchQuery::new("frieren"));
        assert_eq!(qs, "keyword=frieren&sort_id=0&team_id=0&order=date-desc");
    }

    #[test]
    fn test_build_query_string_encodes_keyword() {
        let query = SearchQuery::new("葬送的芙莉莲 1080p").sort_id(2).team_id(117);
        let qs = build_query_string(&query);
        assert!(qs.starts_with("keyword=%E8%91%AC"));
        assert!(qs.contains("%201080p&sort_id=2&team_id=117&order=date-desc"));
    }

    #[test]
    fn test_build_page_url() {
        let url = build_page_url(BASE_URL, 1, "keyword=a&sort_id=0");
        assert_eq!(url, "https://dmhy.org/topics/list/page/1?keyword=a&sort_id=0");
    }

    #[test]
    fn test_build_page_url_trailing_slash() {
        let url = build_page_url("http://127.0.0.1:8080/", 2, "keyword=a");
        assert_eq!(url, "http://127.0.0.1:8080/topics/list/page/2?keyword=a");
    }

    #[test]
    fn test_extract_magnet_decodes_value() {
        let href = "https://mypikpak.com/drive/url-checker?url=magnet%3A%3Fxt%3Durn%3Abtih%3AABC%26dn%3Dshow";
        assert_eq!(
            extract_magnet(href),
            Some("magnet:?xt=urn:btih:ABC&dn=show".to_string())
        );
    }

    #[test]
    fn test_extract_magnet_among_other_params() {
        let href = "/checker?lang=en&url=magnet:?xt=urn:btih:DEF&x=1";
        assert_eq!(extract_magnet(href), Some("magnet:?xt=urn:btih:DEF".to_string()));
    }

    #[test]
    fn test_extract_magnet_encoded_key() {
        let href = "/checker?u%72l=magnet%3A%3Fxt%3Durn%3Abtih%3AGHI";
        assert_eq!(extract_magnet(href), Some("magnet:?xt=urn:btih:GHI".to_string()));
    }

    #[test]
    fn test_extract_magnet_missing_key() {
        assert_eq!(extract_magnet("https://mypikpak.com/drive?link=magnet:x"), None);
    }

    #[test]
    fn test_extract_magnet_no_query() {
        assert_eq!(extract_magnet("https://mypikpak.com/drive"), None);
    }
}
