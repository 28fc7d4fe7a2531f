//! Catalog search query composition.
//!
//! Translates between the storefront's URL query string and a strongly typed
//! [`FilterState`]. Raw parameters never travel past this module.

mod filter;
mod page;

pub use filter::{
    DEFAULT_PAGE_SIZE, Facet, FacetLink, FilterOverride, FilterState, MAX_PAGE_SIZE, MAX_RATING,
    PriceBucket, SortOrder,
};
pub use page::{PageLink, SearchPage};
