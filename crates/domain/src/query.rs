use crate::{error::QueryError, models::CommentId};

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 50;

pub const MAX_PAGE_ID_LEN: usize = 500;
pub const MAX_DOMAIN_LEN: usize = 253;

/// Which page's comments to look at. A page id takes precedence over a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFilter {
    Page(String),
    Domain(String),
}

impl PageFilter {
    pub fn new(page_id: Option<&str>, domain: Option<&str>) -> Result<Self, QueryError> {
        let page_id = page_id.unwrap_or_default();
        let domain = domain.unwrap_or_default();

        if page_id.is_empty() && domain.is_empty() {
            return Err(QueryError::validation("pageId or domain is required"));
        }
        // Byte lengths, matching what clients were historically held to.
        if page_id.len() > MAX_PAGE_ID_LEN || domain.len() > MAX_DOMAIN_LEN {
            return Err(QueryError::validation("Bad request"));
        }

        if !page_id.is_empty() {
            Ok(PageFilter::Page(page_id.to_string()))
        } else {
            Ok(PageFilter::Domain(domain.to_string()))
        }
    }
}

/// The set of comments a count or find runs over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Comments without a parent on the filtered page or domain.
    TopLevel(PageFilter),
    /// Direct replies to one comment.
    RepliesTo(CommentId),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first.
    #[default]
    Asc,
    /// Newest first.
    Desc,
}

impl SortOrder {
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: u32,
    skip: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            skip: 0,
        }
    }
}

impl Pagination {
    /// Lenient parsing of raw query parameters; bad input never fails, it
    /// falls back to the defaults.
    pub fn parse(limit: Option<&str>, skip: Option<&str>) -> Self {
        let limit = match limit.and_then(parse_digits) {
            Some(0) | None => DEFAULT_LIMIT,
            Some(n) => n.min(MAX_LIMIT as u64) as u32,
        };
        let skip = skip.and_then(parse_digits).unwrap_or(0);
        Self { limit, skip }
    }

    pub fn new(limit: u32, skip: u64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            skip,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn skip(&self) -> u64 {
        self.skip
    }
}

/// Only plain ASCII digits are numbers here: no sign, no whitespace.
/// Values too large for a u64 saturate.
fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(s.parse::<u64>().unwrap_or(u64::MAX))
}
