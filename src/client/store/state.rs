use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{OrderLine, Product, ShippingAddress, UserInfo};

use super::totals::CartTotals;

/// A cart line. Identity is the product id; `count_in_stock` is the stock
/// count the catalog reported when the line was last written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: Uuid,
    pub name: String,
    pub slug: String,
    pub image: String,
    pub price: i64,
    pub quantity: u32,
    pub count_in_stock: u32,
}

impl CartItem {
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            image: product.image.clone(),
            price: product.price,
            quantity,
            count_in_stock: stock_count(product),
        }
    }

    pub fn line_total(&self) -> i64 {
        self.price * i64::from(self.quantity)
    }
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        OrderLine {
            product_id: item.product_id,
            name: item.name.clone(),
            slug: item.slug.clone(),
            image: item.image.clone(),
            price: item.price,
            quantity: item.quantity,
        }
    }
}

/// Product reference kept in the wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product_id: Uuid,
    pub name: String,
    pub slug: String,
    pub image: String,
    pub price: i64,
}

impl From<&Product> for WishlistItem {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            image: product.image.clone(),
            price: product.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethod(String);

impl PaymentMethod {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    pub items: Vec<CartItem>,
    pub shipping_address: Option<ShippingAddress>,
    pub payment_method: Option<PaymentMethod>,
}

impl CartState {
    pub fn item(&self, product_id: Uuid) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    pub fn quantity_of(&self, product_id: Uuid) -> u32 {
        self.item(product_id).map_or(0, |item| item.quantity)
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Derived on every call; totals are never stored.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from_items(&self.items)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WishlistState {
    pub items: Vec<WishlistItem>,
}

impl WishlistState {
    pub fn contains(&self, product_id: Uuid) -> bool {
        self.items.iter().any(|item| item.product_id == product_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub user_info: Option<UserInfo>,
    pub cart: CartState,
    pub wishlist: WishlistState,
}

pub(crate) fn stock_count(product: &Product) -> u32 {
    u32::try_from(product.count_in_stock).unwrap_or(0)
}
