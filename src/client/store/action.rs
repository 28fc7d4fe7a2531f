use uuid::Uuid;

use crate::models::{ShippingAddress, UserInfo};

use super::state::{CartItem, PaymentMethod, WishlistItem};

/// Every mutation the store accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Upserts by product id; the payload quantity replaces the current one.
    CartAddItem(CartItem),
    CartRemoveItem(Uuid),
    /// Empties the lines; address and payment method are kept.
    CartClear,
    SaveShippingAddress(ShippingAddress),
    SavePaymentMethod(PaymentMethod),
    WishlistAddItem(WishlistItem),
    WishlistRemoveItem(Uuid),
    UserSignin(UserInfo),
    UserSignout,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::CartAddItem(_) => "CART_ADD_ITEM",
            Action::CartRemoveItem(_) => "CART_REMOVE_ITEM",
            Action::CartClear => "CART_CLEAR",
            Action::SaveShippingAddress(_) => "SAVE_SHIPPING_ADDRESS",
            Action::SavePaymentMethod(_) => "SAVE_PAYMENT_METHOD",
            Action::WishlistAddItem(_) => "WISHLIST_ADD_ITEM",
            Action::WishlistRemoveItem(_) => "WISHLIST_REMOVE_ITEM",
            Action::UserSignin(_) => "USER_SIGNIN",
            Action::UserSignout => "USER_SIGNOUT",
        }
    }
}
