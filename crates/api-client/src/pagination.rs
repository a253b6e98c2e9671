//! List-endpoint query parameters and the pagination envelope.

use serde::Deserialize;

/// Sort direction for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

/// Query parameters accepted by every list endpoint:
/// `page`, `limit`, `search`, `sort`, `order`.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(field.into());
        self.order = Some(order);
        self
    }

    /// The populated parameters as query pairs, in a stable order.
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        if let Some(order) = self.order {
            pairs.push(("order", order.to_string()));
        }
        pairs
    }
}

/// The backend's pagination envelope.
///
/// `pages` is authoritative for paging controls. It is never recomputed from
/// `total` and `limit` on this side; if the backend rounds differently than
/// we would, the backend wins.
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

impl<T> Paginated<T> {
    /// Whether a "next page" control should be enabled.
    pub fn has_next_page(&self) -> bool {
        self.page < self.pages
    }

    /// Whether a "previous page" control should be enabled.
    pub fn has_prev_page(&self) -> bool {
        self.page > 1
    }
}
