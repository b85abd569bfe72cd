//! Torrent search: fetching raw payloads from flaky mirrors,
//! normalizing the two payload shapes, and ranking/selecting results.

mod mirrors;
mod parser;
mod resolver;
mod select;
mod source;
mod types;

pub use mirrors::{
    discover_mirrors, fallback_url, parse_proxy_list, EndpointShape, Mirror, FALLBACK_ORIGIN,
    PROXY_LIST_URL,
};
pub use parser::{humanize_size, normalize, parse_api, parse_page, RawPayload};
pub use resolver::MirrorResolver;
pub use select::{
    parse_index_tokens, rank_results, select, select_automatic, select_interactive, SelectionMode,
};
pub use source::{FetchError, HttpSource, SourceFetch};
pub use types::{category_code, Category, SearchResult, WILDCARD_CATEGORY};
