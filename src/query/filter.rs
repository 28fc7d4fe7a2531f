use std::fmt;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use utoipa::ToSchema;

pub const DEFAULT_PAGE_SIZE: u32 = 12;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const MAX_RATING: u8 = 5;

const ALL: &str = "all";

/// One filter dimension: either unrestricted or pinned to a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facet<T> {
    #[default]
    All,
    Only(T),
}

impl<T> Facet<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Facet::All)
    }

    pub fn as_only(&self) -> Option<&T> {
        match self {
            Facet::All => None,
            Facet::Only(value) => Some(value),
        }
    }
}

impl Facet<String> {
    /// Free-text facets treat blank input and the literal `all` as unrestricted.
    pub fn text(value: impl AsRef<str>) -> Self {
        let value = value.as_ref().trim();
        if value.is_empty() || value == ALL {
            Facet::All
        } else {
            Facet::Only(value.to_string())
        }
    }

    fn as_param(&self) -> &str {
        match self {
            Facet::All => ALL,
            Facet::Only(value) => value,
        }
    }
}

impl Facet<u8> {
    /// Minimum star rating; anything outside `0..=5` is unrestricted.
    pub fn rating(stars: u8) -> Self {
        if stars <= MAX_RATING {
            Facet::Only(stars)
        } else {
            Facet::All
        }
    }

    fn from_param(value: &str) -> Self {
        value
            .trim()
            .parse::<u8>()
            .map(Facet::rating)
            .unwrap_or(Facet::All)
    }

    fn to_param(self) -> String {
        match self {
            Facet::All => ALL.to_string(),
            Facet::Only(stars) => stars.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum PriceBucket {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "1-50")]
    From1To50,
    #[serde(rename = "51-200")]
    From51To200,
    #[serde(rename = "201-1000")]
    From201To1000,
}

impl PriceBucket {
    /// Buckets offered by the filter sidebar, cheapest first.
    pub const CHOICES: [PriceBucket; 3] = [
        PriceBucket::From1To50,
        PriceBucket::From51To200,
        PriceBucket::From201To1000,
    ];

    pub fn as_param(self) -> &'static str {
        match self {
            PriceBucket::All => ALL,
            PriceBucket::From1To50 => "1-50",
            PriceBucket::From51To200 => "51-200",
            PriceBucket::From201To1000 => "201-1000",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim() {
            ALL => Some(PriceBucket::All),
            "1-50" => Some(PriceBucket::From1To50),
            "51-200" => Some(PriceBucket::From51To200),
            "201-1000" => Some(PriceBucket::From201To1000),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriceBucket::All => "Any",
            PriceBucket::From1To50 => "$1 to $50",
            PriceBucket::From51To200 => "$51 to $200",
            PriceBucket::From201To1000 => "$201 to $1000",
        }
    }

    /// Inclusive price range in cents, `None` for the unrestricted bucket.
    pub fn bounds_cents(self) -> Option<(i64, i64)> {
        match self {
            PriceBucket::All => None,
            PriceBucket::From1To50 => Some((100, 5_000)),
            PriceBucket::From51To200 => Some((5_100, 20_000)),
            PriceBucket::From201To1000 => Some((20_100, 100_000)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Lowest,
    Highest,
    TopRated,
}

impl SortOrder {
    pub const CHOICES: [SortOrder; 4] = [
        SortOrder::Newest,
        SortOrder::Lowest,
        SortOrder::Highest,
        SortOrder::TopRated,
    ];

    pub fn as_param(self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Lowest => "lowest",
            SortOrder::Highest => "highest",
            SortOrder::TopRated => "toprated",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim() {
            "newest" => Some(SortOrder::Newest),
            "lowest" => Some(SortOrder::Lowest),
            "highest" => Some(SortOrder::Highest),
            "toprated" => Some(SortOrder::TopRated),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Newest => "Newest Arrivals",
            SortOrder::Lowest => "Price: Low to High",
            SortOrder::Highest => "Price: High to Low",
            SortOrder::TopRated => "Avg. Customer Reviews",
        }
    }
}

/// The complete set of catalog search facets.
///
/// A `FilterState` is always in canonical form: every constructor normalises
/// its input, so `FilterState::parse(&state.serialize()) == state` holds for
/// every value of this type. The default is "everything, newest first,
/// page 1".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterState {
    query: Facet<String>,
    category: Facet<String>,
    brand: Facet<String>,
    price: PriceBucket,
    rating: Facet<u8>,
    order: SortOrder,
    page: u32,
    page_size: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            query: Facet::All,
            category: Facet::All,
            brand: Facet::All,
            price: PriceBucket::All,
            rating: Facet::All,
            order: SortOrder::Newest,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FilterState {
    /// Parses a query string such as `?category=Shampoo&page=2`.
    ///
    /// Never fails: unknown keys are ignored, missing keys keep their
    /// defaults and unparseable numbers fall back to the default value.
    pub fn parse(query_string: &str) -> Self {
        let raw = query_string.strip_prefix('?').unwrap_or(query_string);
        Self::from_pairs(form_urlencoded::parse(raw.as_bytes()))
    }

    /// Builds a state from already-decoded key/value pairs. Later duplicates win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut state = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "query" => state.query = Facet::text(value),
                "category" => state.category = Facet::text(value),
                "brand" => state.brand = Facet::text(value),
                "price" => state.price = PriceBucket::from_param(value).unwrap_or_default(),
                "rating" => state.rating = Facet::<u8>::from_param(value),
                "order" => state.order = SortOrder::from_param(value).unwrap_or_default(),
                "page" => state.page = normalize_page(parse_number(value)),
                "pageSize" => state.page_size = normalize_page_size(parse_number(value)),
                _ => {}
            }
        }
        state
    }

    /// Canonical query string: fixed key order, every facet present.
    pub fn serialize(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("category", self.category.as_param())
            .append_pair("query", self.query.as_param())
            .append_pair("brand", self.brand.as_param())
            .append_pair("price", self.price.as_param())
            .append_pair("rating", &self.rating.to_param())
            .append_pair("order", self.order.as_param())
            .append_pair("page", &self.page.to_string())
            .append_pair("pageSize", &self.page_size.to_string())
            .finish()
    }

    /// Replaces the facets named in `changes` and keeps every other one,
    /// including the current page.
    pub fn with_override(&self, changes: &FilterOverride) -> FilterState {
        FilterState {
            query: changes.query.clone().unwrap_or_else(|| self.query.clone()),
            category: changes
                .category
                .clone()
                .unwrap_or_else(|| self.category.clone()),
            brand: changes.brand.clone().unwrap_or_else(|| self.brand.clone()),
            price: changes.price.unwrap_or(self.price),
            rating: changes.rating.unwrap_or(self.rating),
            order: changes.order.unwrap_or(self.order),
            page: changes.page.unwrap_or(self.page),
            page_size: changes.page_size.unwrap_or(self.page_size),
        }
    }

    /// Request path for the catalog search endpoint.
    pub fn search_path(&self) -> String {
        format!("/api/products/search?{}", self.serialize())
    }

    /// Storefront link that reproduces this state.
    pub fn link(&self) -> String {
        format!("/search?{}", self.serialize())
    }

    /// Sidebar links for every price bucket, "Any" first.
    pub fn price_links(&self) -> Vec<FacetLink> {
        std::iter::once(PriceBucket::All)
            .chain(PriceBucket::CHOICES)
            .map(|price| FacetLink {
                label: price.label(),
                href: self.with_override(&FilterOverride::new().price(price)).link(),
                active: price == self.price,
            })
            .collect()
    }

    /// "Sort by" links in display order.
    pub fn sort_links(&self) -> Vec<FacetLink> {
        SortOrder::CHOICES
            .into_iter()
            .map(|order| FacetLink {
                label: order.label(),
                href: self.with_override(&FilterOverride::new().order(order)).link(),
                active: order == self.order,
            })
            .collect()
    }

    /// Whether any content facet narrows the result set.
    pub fn is_filtered(&self) -> bool {
        !self.query.is_all()
            || !self.category.is_all()
            || !self.brand.is_all()
            || self.price != PriceBucket::All
            || !self.rating.is_all()
    }

    pub fn query(&self) -> &Facet<String> {
        &self.query
    }

    pub fn category(&self) -> &Facet<String> {
        &self.category
    }

    pub fn brand(&self) -> &Facet<String> {
        &self.brand
    }

    pub fn price(&self) -> PriceBucket {
        self.price
    }

    pub fn rating(&self) -> Facet<u8> {
        self.rating
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows to skip for the current page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

/// A labelled link that pins one facet and keeps the rest of the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetLink {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

/// A partial set of facets applied through [`FilterState::with_override`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOverride {
    query: Option<Facet<String>>,
    category: Option<Facet<String>>,
    brand: Option<Facet<String>>,
    price: Option<PriceBucket>,
    rating: Option<Facet<u8>>,
    order: Option<SortOrder>,
    page: Option<u32>,
    page_size: Option<u32>,
}

impl FilterOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl AsRef<str>) -> Self {
        self.query = Some(Facet::text(query));
        self
    }

    pub fn category(mut self, category: impl AsRef<str>) -> Self {
        self.category = Some(Facet::text(category));
        self
    }

    pub fn brand(mut self, brand: impl AsRef<str>) -> Self {
        self.brand = Some(Facet::text(brand));
        self
    }

    pub fn price(mut self, price: PriceBucket) -> Self {
        self.price = Some(price);
        self
    }

    pub fn min_rating(mut self, stars: u8) -> Self {
        self.rating = Some(Facet::rating(stars));
        self
    }

    pub fn any_rating(mut self) -> Self {
        self.rating = Some(Facet::All);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(normalize_page(Some(page)));
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(normalize_page_size(Some(page_size)));
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn parse_number(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

fn normalize_page(page: Option<u32>) -> u32 {
    match page {
        Some(page) if page >= 1 => page,
        _ => 1,
    }
}

fn normalize_page_size(page_size: Option<u32>) -> u32 {
    match page_size {
        Some(size) if size >= 1 => size.min(MAX_PAGE_SIZE),
        _ => DEFAULT_PAGE_SIZE,
    }
}
