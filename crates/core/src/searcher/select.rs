//! Result ranking and selection.
//!
//! Results are ranked by leecher count (a liveness signal for this
//! index) with a stable sort so same-count results keep their source
//! order. Selection is either automatic (top result) or interactive
//! (indices read from a prompt).

use std::io::{BufRead, Write};

use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::warn;

use super::types::SearchResult;

/// How a result set is narrowed down to the entries to transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Take the top-ranked result without prompting.
    Automatic,
    /// Show the ranked table and read indices from the user.
    Interactive,
}

/// Rank in place: leechers descending, stable.
pub fn rank_results(results: &mut [SearchResult]) {
    results.sort_by(|a, b| b.leechers.cmp(&a.leechers));
}

static TOKEN_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,\s]+").unwrap());

/// Parse a line of user input into valid, deduplicated row indices.
///
/// Tokens that are not numbers or fall outside `0..limit` are warned
/// about and skipped. Duplicates keep their first position.
pub fn parse_index_tokens(line: &str, limit: usize) -> Vec<usize> {
    let mut picked = Vec::new();
    for token in TOKEN_SPLIT_RE.split(line.trim()) {
        if token.is_empty() {
            continue;
        }
        match token.parse::<usize>() {
            Ok(index) if index < limit => {
                if !picked.contains(&index) {
                    picked.push(index);
                }
            }
            Ok(index) => {
                warn!(index = index, limit = limit, "Selection out of range, skipping");
            }
            Err(_) => {
                warn!(token = token, "Selection is not a number, skipping");
            }
        }
    }
    picked
}

/// Pick the top-ranked result, if any.
pub fn select_automatic(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut results = results;
    rank_results(&mut results);
    results.truncate(1);
    results
}

/// Show the ranked table on `out` and read a selection line from `input`.
pub fn select_interactive<R: BufRead, W: Write>(
    results: Vec<SearchResult>,
    input: &mut R,
    out: &mut W,
) -> std::io::Result<Vec<SearchResult>> {
    let mut results = results;
    rank_results(&mut results);

    writeln!(out, "ID:    S  |    Size    |     Title")?;
    for (index, result) in results.iter().enumerate() {
        writeln!(
            out,
            "{:2}:  {:4} | {:>10} | {}",
            index,
            result.seeders,
            result.size.replace('\u{a0}', " "),
            result.title
        )?;
    }
    write!(out, "Pick results (space or comma separated): ")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let indices = parse_index_tokens(&line, results.len());
    let mut chosen = Vec::with_capacity(indices.len());
    for index in indices {
        chosen.push(results[index].clone());
    }
    Ok(chosen)
}

/// Narrow `results` per `mode`, prompting on stdin/stdout when
/// interactive.
pub fn select(results: Vec<SearchResult>, mode: SelectionMode) -> std::io::Result<Vec<SearchResult>> {
    match mode {
        SelectionMode::Automatic => Ok(select_automatic(results)),
        SelectionMode::Interactive => {
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut out = std::io::stdout();
            select_interactive(results, &mut input, &mut out)
        }
    }
}
