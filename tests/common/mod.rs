#![allow(dead_code)]

use chrono::Utc;
use storefront::{
    client::store::CartItem,
    models::{Product, ShippingAddress, UserInfo},
};
use uuid::Uuid;

pub fn payment_methods() -> Vec<String> {
    vec!["PayPal".to_string(), "Stripe".to_string()]
}

pub fn product(name: &str, price: i64, count_in_stock: i32) -> Product {
    let slug = name.to_lowercase().replace(' ', "-");
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        image: format!("/images/{slug}.jpg"),
        slug,
        brand: "Salon Pro".to_string(),
        category: "Shampoo".to_string(),
        description: None,
        price,
        count_in_stock,
        rating: 4.5,
        num_reviews: 2,
        created_at: Utc::now(),
    }
}

pub fn line(product: &Product, quantity: u32) -> CartItem {
    CartItem::from_product(product, quantity)
}

pub fn address() -> ShippingAddress {
    ShippingAddress {
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        address: "12 Main Street".into(),
        city: "Springfield".into(),
        country: "US".into(),
        country_state: "IL".into(),
        postal_code: "62701".into(),
        ..ShippingAddress::default()
    }
}

pub fn user() -> UserInfo {
    UserInfo {
        id: Uuid::new_v4(),
        name: "Jane".into(),
        email: "jane@example.com".into(),
        is_admin: false,
        token: "token-123".into(),
    }
}
