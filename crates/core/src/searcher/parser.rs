//! Normalization of raw index payloads into [`SearchResult`]s.
//!
//! Two raw shapes exist in the wild: the structured JSON API and the
//! legacy HTML listing page. Both normalization paths are total
//! functions: malformed payloads or rows produce fewer results, never
//! an error.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use super::types::SearchResult;

/// Maximum entries taken from one API payload.
const API_RESULT_CAP: usize = 30;

/// Raw payload tagged by the endpoint shape it came from.
#[derive(Debug, Clone)]
pub enum RawPayload {
    /// JSON body from the structured API endpoint.
    Api(String),
    /// HTML body from the listing-page endpoint.
    Page(String),
}

/// Normalize a raw payload into usable results.
pub fn normalize(payload: &RawPayload) -> Vec<SearchResult> {
    match payload {
        RawPayload::Api(body) => parse_api(body),
        RawPayload::Page(body) => parse_page(body),
    }
}

/// One entry of the structured API response. All numeric fields arrive
/// as strings on some mirrors and as numbers on others.
#[derive(Debug, Deserialize)]
struct ApiEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    info_hash: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    seeders: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    leechers: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    size: u64,
}

/// Accept a u64 encoded as either a JSON number or a string.
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_u64().unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

impl ApiEntry {
    fn into_search_result(self) -> SearchResult {
        SearchResult {
            title: self.name,
            magnet: format!("magnet:?xt=urn:btih:{}", self.info_hash),
            size: humanize_size(self.size),
            size_bytes: self.size,
            seeders: self.seeders.min(u32::MAX as u64) as u32,
            leechers: self.leechers.min(u32::MAX as u64) as u32,
        }
    }
}

/// Parse the structured API shape.
///
/// A single-entry response whose `id` is `"0"` is the API's "no results"
/// marker and yields an empty set.
pub fn parse_api(body: &str) -> Vec<SearchResult> {
    let entries: Vec<ApiEntry> = match serde_json::from_str(body) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(error = %e, "API payload did not parse, skipping");
            return Vec::new();
        }
    };

    if entries.len() == 1 && entries[0].id == "0" {
        return Vec::new();
    }

    entries
        .into_iter()
        .take(API_RESULT_CAP)
        .filter_map(|entry| {
            if entry.name.is_empty() && entry.info_hash.is_empty() {
                return None;
            }
            Some(entry.into_search_result())
        })
        .collect()
}

static RESULT_TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<table[^>]*id="searchResult"[^>]*>(.*?)</table>"#).unwrap());
static ANCHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<a[^>]*href="([^"]*)"[^>]*>(.*?)</a>"#).unwrap());
static DESC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<font[^>]*class="detDesc"[^>]*>(.*?)</font>"#).unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Width of the size label inside the description cell ("Size X" prefix).
const SIZE_LABEL_WIDTH: usize = 6;

/// Parse the HTML listing-page shape.
///
/// Rows that do not match the expected cell structure are skipped; the
/// remaining rows still normalize.
pub fn parse_page(body: &str) -> Vec<SearchResult> {
    let Some(table) = RESULT_TABLE_RE
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
    else {
        return Vec::new();
    };

    // First <tr is the header row.
    table
        .split("<tr")
        .skip(2)
        .filter_map(parse_row)
        .collect()
}

/// Normalize one table row. Any structural mismatch yields `None`.
fn parse_row(row: &str) -> Option<SearchResult> {
    // Each segment still starts with the tag's own attributes and `>`.
    let cells: Vec<&str> = row
        .split("<td")
        .skip(1)
        .filter_map(|cell| cell.split("</td>").next())
        .filter_map(|cell| cell.split_once('>').map(|(_, body)| body))
        .collect();
    if cells.len() < 4 {
        return None;
    }

    // The title cell holds the detail-page anchor first, the magnet
    // anchor second, and the description line below them.
    let title_cell = cells[1];
    let anchors: Vec<_> = ANCHOR_RE.captures_iter(title_cell).collect();
    let title = cell_text(anchors.first()?.get(2)?.as_str());
    let magnet = anchors.get(1)?.get(1)?.as_str().to_string();
    if title.is_empty() && magnet.is_empty() {
        return None;
    }

    let seeders: u32 = cell_text(cells[cells.len() - 2]).parse().ok()?;
    let leechers: u32 = cell_text(cells[cells.len() - 1]).parse().ok()?;

    let description = cell_text(DESC_RE.captures(title_cell)?.get(1)?.as_str());
    let size = description
        .split(',')
        .nth(1)?
        .chars()
        .skip(SIZE_LABEL_WIDTH)
        .collect::<String>()
        .trim()
        .to_string();

    Some(SearchResult {
        title,
        magnet,
        size,
        size_bytes: 0,
        seeders,
        leechers,
    })
}

/// Strip markup and normalize non-breaking spaces in a cell.
fn cell_text(cell: &str) -> String {
    TAG_RE
        .replace_all(cell, "")
        .replace('\u{a0}', " ")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

/// Humanize a byte count with binary prefixes, one decimal place.
pub fn humanize_size(bytes: u64) -> String {
    const UNITS: [&str; 8] = ["", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB"];

    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{:.1}{}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1}YiB", size)
}
