use serde::{Deserialize, Serialize};

use crate::config::PagingConfig;

pub const DEFAULT_PAGE_NUMBER: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    #[inline]
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortDir::Asc
        } else {
            SortDir::Desc
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }

    /// Apply this direction to an ascending comparison result.
    #[inline]
    pub fn apply(self, ord: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    }
}

/// Page request for a single call: 1-based page number, page size, direction
/// and an optional case-insensitive sort field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page_number: u32,
    pub page_size: u32,
    pub ascending: bool,
    pub sort_field: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
            ascending: false,
            sort_field: None,
        }
    }
}

impl PageRequest {
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size,
            ..Self::default()
        }
    }

    pub fn ascending(mut self, ascending: bool) -> Self {
        self.ascending = ascending;
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.sort_field = Some(field.into());
        self
    }

    pub fn dir(&self) -> SortDir {
        SortDir::from_ascending(self.ascending)
    }
}

/// Loosely-typed page parameters as they arrive from a request payload.
///
/// Missing values are filled from [`PagingConfig`] by [`PageQuery::resolve`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageQuery {
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
    #[serde(alias = "ascendingOrder")]
    pub ascending: Option<bool>,
    #[serde(alias = "orderBy")]
    pub sort_field: Option<String>,
}

impl PageQuery {
    pub fn resolve(self, cfg: &PagingConfig) -> PageRequest {
        PageRequest {
            page_number: self.page_number.unwrap_or(DEFAULT_PAGE_NUMBER),
            page_size: self.page_size.unwrap_or(cfg.default_page_size),
            ascending: self.ascending.unwrap_or(cfg.default_ascending),
            sort_field: self.sort_field.filter(|s| !s.trim().is_empty()),
        }
    }
}

impl From<PageQuery> for PageRequest {
    fn from(q: PageQuery) -> Self {
        q.resolve(&PagingConfig::default())
    }
}
