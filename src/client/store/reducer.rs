use super::{
    action::Action,
    state::{CartState, PaymentMethod, StoreState},
};

/// Applies `action` to `state`.
///
/// Total over every state: an action whose precondition does not hold
/// returns the state unchanged.
pub fn reduce(mut state: StoreState, action: Action, payment_methods: &[String]) -> StoreState {
    match action {
        Action::CartAddItem(item) => {
            if item.quantity == 0 || item.quantity > item.count_in_stock {
                return state;
            }
            match state
                .cart
                .items
                .iter_mut()
                .find(|existing| existing.product_id == item.product_id)
            {
                Some(existing) => *existing = item,
                None => state.cart.items.push(item),
            }
        }
        Action::CartRemoveItem(product_id) => {
            state.cart.items.retain(|item| item.product_id != product_id);
        }
        Action::CartClear => state.cart.items.clear(),
        Action::SaveShippingAddress(address) => {
            if address.is_complete() {
                state.cart.shipping_address = Some(address);
            }
        }
        Action::SavePaymentMethod(method) => {
            if is_allowed(&method, payment_methods) {
                state.cart.payment_method = Some(method);
            }
        }
        Action::WishlistAddItem(item) => {
            if !state.wishlist.contains(item.product_id) {
                state.wishlist.items.push(item);
            }
        }
        Action::WishlistRemoveItem(product_id) => {
            state
                .wishlist
                .items
                .retain(|item| item.product_id != product_id);
        }
        Action::UserSignin(user) => state.user_info = Some(user),
        Action::UserSignout => {
            state.user_info = None;
            state.cart = CartState::default();
        }
    }
    state
}

pub fn is_allowed(method: &PaymentMethod, payment_methods: &[String]) -> bool {
    payment_methods
        .iter()
        .any(|allowed| allowed == method.as_str())
}
