use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::filter::{FilterOverride, FilterState};

/// One page of catalog search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage<T> {
    pub products: Vec<T>,
    pub page: u32,
    pub pages: u32,
    pub count_products: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub page: u32,
    pub href: String,
    pub current: bool,
}

impl<T> SearchPage<T> {
    /// Wraps one page of rows fetched for `filter` out of `count_products` matches.
    pub fn new(products: Vec<T>, filter: &FilterState, count_products: u64) -> Self {
        let pages = count_products.div_ceil(u64::from(filter.page_size()));
        Self {
            products,
            page: filter.page(),
            pages: u32::try_from(pages).unwrap_or(u32::MAX),
            count_products,
        }
    }

    /// Whether `page` can be rendered, i.e. lies in `[1, pages]`.
    pub fn in_bounds(&self) -> bool {
        self.page >= 1 && self.page <= self.pages
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Pagination links that keep every facet of `filter` except the page.
    pub fn page_links(&self, filter: &FilterState) -> Vec<PageLink> {
        (1..=self.pages)
            .map(|page| PageLink {
                page,
                href: filter.with_override(&FilterOverride::new().page(page)).link(),
                current: page == self.page,
            })
            .collect()
    }
}
