//! Client-side cart, wishlist and session store.
//!
//! The store is an explicit handle: callers own it (or borrow it) and mutate it
//! only through [`Store::dispatch`]. After each change the affected keys are
//! written to [`Storage`]; on open each key is read back independently.

mod action;
mod reducer;
mod state;
mod totals;

use std::collections::HashSet;

use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::models::{ShippingAddress, UserInfo};

use super::{config::ClientConfig, error::StorageError, storage::FileStorage, storage::Storage};

pub use action::Action;
pub use reducer::{is_allowed, reduce};
pub use state::{
    CartItem, CartState, PaymentMethod, StoreState, WishlistItem, WishlistState,
};
pub use totals::{
    CartTotals, FREE_SHIPPING_THRESHOLD, SHIPPING_FEE, TAX_RATE_PERCENT, format_cents,
};

pub(crate) use state::stock_count;

pub const USER_INFO_KEY: &str = "userInfo";
pub const SHIPPING_ADDRESS_KEY: &str = "shippingAddress";
pub const PAYMENT_METHOD_KEY: &str = "paymentMethod";
pub const CART_ITEMS_KEY: &str = "cartItems";
pub const WISHLIST_ITEMS_KEY: &str = "wishlistItems";

pub struct Store<S: Storage> {
    state: StoreState,
    storage: S,
    payment_methods: Vec<String>,
}

impl Store<FileStorage> {
    /// Opens the store persisted at `config.store_path`.
    pub fn open_local(config: &ClientConfig) -> Self {
        Store::open(
            FileStorage::open(&config.store_path),
            config.payment_methods.clone(),
        )
    }
}

impl<S: Storage> Store<S> {
    /// Rehydrates the state from `storage`. Never fails: a missing or corrupt
    /// key yields the default for that part of the state.
    pub fn open(storage: S, payment_methods: Vec<String>) -> Self {
        let user_info = read_key::<UserInfo>(&storage, USER_INFO_KEY);
        let shipping_address = read_key::<ShippingAddress>(&storage, SHIPPING_ADDRESS_KEY)
            .filter(ShippingAddress::is_complete);
        let payment_method = read_key::<PaymentMethod>(&storage, PAYMENT_METHOD_KEY)
            .filter(|method| is_allowed(method, &payment_methods));
        let mut items = read_key::<Vec<CartItem>>(&storage, CART_ITEMS_KEY).unwrap_or_default();
        items.retain(|item| item.quantity >= 1);
        let items = first_by_product(items, |item| item.product_id);
        let wishlist = first_by_product(
            read_key::<Vec<WishlistItem>>(&storage, WISHLIST_ITEMS_KEY).unwrap_or_default(),
            |item| item.product_id,
        );

        let state = StoreState {
            user_info,
            cart: CartState {
                items,
                shipping_address,
                payment_method,
            },
            wishlist: WishlistState { items: wishlist },
        };
        tracing::debug!(
            cart_lines = state.cart.items.len(),
            wishlist = state.wishlist.items.len(),
            signed_in = state.user_info.is_some(),
            "store rehydrated"
        );

        Self {
            state,
            storage,
            payment_methods,
        }
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn totals(&self) -> CartTotals {
        self.state.cart.totals()
    }

    pub fn payment_methods(&self) -> &[String] {
        &self.payment_methods
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.user_info.is_some()
    }

    /// Applies `action` and persists the result. Returns whether the state
    /// changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let name = action.name();
        let next = reduce(self.state.clone(), action, &self.payment_methods);
        if next == self.state {
            tracing::debug!(action = name, "action left state unchanged");
            return false;
        }

        let previous = std::mem::replace(&mut self.state, next);
        let failed = self.persist(&previous);
        if failed > 0 {
            tracing::warn!(action = name, failed, "store snapshot partially persisted");
        }
        tracing::debug!(action = name, "action applied");
        true
    }

    /// Writes every key that differs from `previous`. A failed key does not
    /// stop the others; returns the number of keys that could not be written.
    fn persist(&mut self, previous: &StoreState) -> usize {
        let current = &self.state;
        let storage = &mut self.storage;
        let mut results = Vec::new();
        if current.user_info != previous.user_info {
            results.push((
                USER_INFO_KEY,
                write_key(storage, USER_INFO_KEY, current.user_info.as_ref()),
            ));
        }
        if current.cart.shipping_address != previous.cart.shipping_address {
            results.push((
                SHIPPING_ADDRESS_KEY,
                write_key(
                    storage,
                    SHIPPING_ADDRESS_KEY,
                    current.cart.shipping_address.as_ref(),
                ),
            ));
        }
        if current.cart.payment_method != previous.cart.payment_method {
            results.push((
                PAYMENT_METHOD_KEY,
                write_key(
                    storage,
                    PAYMENT_METHOD_KEY,
                    current.cart.payment_method.as_ref(),
                ),
            ));
        }
        if current.cart.items != previous.cart.items {
            let items = Some(&current.cart.items).filter(|items| !items.is_empty());
            results.push((CART_ITEMS_KEY, write_key(storage, CART_ITEMS_KEY, items)));
        }
        if current.wishlist != previous.wishlist {
            let items = Some(&current.wishlist.items).filter(|items| !items.is_empty());
            results.push((
                WISHLIST_ITEMS_KEY,
                write_key(storage, WISHLIST_ITEMS_KEY, items),
            ));
        }

        let mut failed = 0;
        for (key, result) in results {
            if let Err(err) = result {
                tracing::warn!(key, error = %err, "persisting key failed");
                failed += 1;
            }
        }
        failed
    }
}

/// Keeps the first entry per product id, in their original order.
fn first_by_product<T>(items: Vec<T>, product_id: impl Fn(&T) -> Uuid) -> Vec<T> {
    let mut seen = HashSet::new();
    let before = items.len();
    let kept: Vec<T> = items
        .into_iter()
        .filter(|item| seen.insert(product_id(item)))
        .collect();
    if kept.len() < before {
        tracing::warn!(dropped = before - kept.len(), "dropped duplicate persisted entries");
    }
    kept
}

fn read_key<T: DeserializeOwned>(storage: &impl Storage, key: &str) -> Option<T> {
    let raw = match storage.get(key) {
        Ok(raw) => raw?,
        Err(err) => {
            tracing::warn!(key, error = %err, "reading persisted key failed");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, error = %err, "discarding corrupt persisted key");
            None
        }
    }
}

fn write_key<T: Serialize>(
    storage: &mut impl Storage,
    key: &str,
    value: Option<&T>,
) -> Result<(), StorageError> {
    match value {
        Some(value) => storage.set(key, &serde_json::to_string(value)?),
        None => storage.remove(key),
    }
}
