use serde::{Deserialize, Serialize};

use super::state::CartItem;

/// Carts strictly above this subtotal ship free. Cents.
pub const FREE_SHIPPING_THRESHOLD: i64 = 100_00;
pub const SHIPPING_FEE: i64 = 10_00;
pub const TAX_RATE_PERCENT: i64 = 15;

/// Order totals in cents, recomputed from the cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub items_price: i64,
    pub shipping_price: i64,
    pub tax_price: i64,
    pub total_price: i64,
}

impl CartTotals {
    pub fn from_items(items: &[CartItem]) -> Self {
        let items_price: i64 = items.iter().map(CartItem::line_total).sum();
        let shipping_price = if items_price > FREE_SHIPPING_THRESHOLD {
            0
        } else {
            SHIPPING_FEE
        };
        let tax_price = round_div(items_price * TAX_RATE_PERCENT, 100);
        Self {
            items_price,
            shipping_price,
            tax_price,
            total_price: items_price + shipping_price + tax_price,
        }
    }
}

/// Integer division rounding half away from zero.
fn round_div(numerator: i64, denominator: i64) -> i64 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

/// Formats cents as a dollar amount, e.g. `10775` as `$107.75`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{sign}${}.{:02}", cents / 100, cents % 100)
}
