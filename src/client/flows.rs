//! Storefront user actions that combine catalog calls with store dispatches.
//!
//! Each flow finishes its catalog request before dispatching, and a failed
//! request leaves the store untouched. Stock checks read the current count
//! and decide; nothing is reserved, so two shoppers can pass the same check.

use uuid::Uuid;

use crate::{
    dto::{
        auth::SigninRequest,
        orders::OrderSubmission,
        products::{ReviewCreated, ReviewRequest},
    },
    models::{Order, OrderLine, Product, ShippingAddress, UserInfo},
    query::{FilterState, SearchPage},
};

use super::{
    catalog::CatalogService,
    error::{ClientError, ClientResult},
    storage::Storage,
    store::{Action, CartItem, PaymentMethod, Store, WishlistItem, format_cents, is_allowed, stock_count},
};

pub async fn load_search<C: CatalogService>(
    catalog: &C,
    filter: &FilterState,
) -> ClientResult<SearchPage<Product>> {
    let page = catalog.search(filter).await?;
    if !page.in_bounds() && !page.is_empty() {
        tracing::warn!(page = page.page, pages = page.pages, "catalog returned rows for an out-of-range page");
    }
    Ok(page)
}

/// Storefront landing page sections.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeSections {
    pub new_products: Vec<Product>,
    pub best_sellers: Vec<Product>,
}

pub async fn load_home<C: CatalogService>(catalog: &C) -> ClientResult<HomeSections> {
    let new_products = catalog.new_products().await?;
    let best_sellers = catalog.best_sellers().await?;
    Ok(HomeSections {
        new_products,
        best_sellers,
    })
}

/// Other products from the category of `product`, for the detail page.
pub async fn suggested_products<C: CatalogService>(
    catalog: &C,
    product: &Product,
) -> ClientResult<Vec<Product>> {
    let mut products = catalog.products_in_category(&product.category).await?;
    products.retain(|candidate| candidate.id != product.id);
    Ok(products)
}

/// Adds `quantity` more of `product` to the cart after checking stock.
/// Returns the resulting line quantity.
pub async fn add_to_cart<S: Storage, C: CatalogService>(
    store: &mut Store<S>,
    catalog: &C,
    product: &Product,
    quantity: u32,
) -> ClientResult<u32> {
    if quantity == 0 {
        return Err(ClientError::Validation("quantity must be at least 1".into()));
    }
    let wanted = store
        .state()
        .cart
        .quantity_of(product.id)
        .checked_add(quantity)
        .ok_or_else(|| ClientError::Validation("quantity is too large".into()))?;
    set_cart_quantity(store, catalog, product.id, wanted).await
}

/// Sets the cart quantity of `product_id` to exactly `quantity`.
pub async fn update_cart_quantity<S: Storage, C: CatalogService>(
    store: &mut Store<S>,
    catalog: &C,
    product_id: Uuid,
    quantity: u32,
) -> ClientResult<u32> {
    if quantity == 0 {
        return Err(ClientError::Validation("quantity must be at least 1".into()));
    }
    set_cart_quantity(store, catalog, product_id, quantity).await
}

async fn set_cart_quantity<S: Storage, C: CatalogService>(
    store: &mut Store<S>,
    catalog: &C,
    product_id: Uuid,
    quantity: u32,
) -> ClientResult<u32> {
    let current = catalog.product(product_id).await?;
    let in_stock = stock_count(&current);
    if in_stock < quantity {
        tracing::info!(%product_id, requested = quantity, in_stock, "add to cart rejected");
        return Err(ClientError::StockConflict {
            product_id,
            requested: quantity,
            in_stock,
        });
    }

    store.dispatch(Action::CartAddItem(CartItem::from_product(&current, quantity)));
    Ok(quantity)
}

pub fn remove_from_cart<S: Storage>(store: &mut Store<S>, product_id: Uuid) -> bool {
    store.dispatch(Action::CartRemoveItem(product_id))
}

/// Adds `product` to the wishlist, or removes it when already present.
/// Returns whether the product is on the wishlist afterwards.
pub fn toggle_wishlist<S: Storage>(store: &mut Store<S>, product: &Product) -> bool {
    if store.state().wishlist.contains(product.id) {
        store.dispatch(Action::WishlistRemoveItem(product.id));
        false
    } else {
        store.dispatch(Action::WishlistAddItem(WishlistItem::from(product)));
        true
    }
}

/// Validates and saves the checkout form.
pub fn save_checkout_details<S: Storage>(
    store: &mut Store<S>,
    address: ShippingAddress,
    payment_method: PaymentMethod,
) -> ClientResult<()> {
    if !store.is_signed_in() {
        return Err(ClientError::AuthRequired);
    }
    let missing = address.missing_fields();
    if !missing.is_empty() {
        return Err(ClientError::Validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }
    if !is_allowed(&payment_method, store.payment_methods()) {
        return Err(ClientError::Validation(format!(
            "unsupported payment method: {payment_method}"
        )));
    }

    store.dispatch(Action::SaveShippingAddress(address));
    store.dispatch(Action::SavePaymentMethod(payment_method));
    Ok(())
}

/// Submits the cart as an order and clears it on success.
pub async fn place_order<S: Storage, C: CatalogService>(
    store: &mut Store<S>,
    catalog: &C,
) -> ClientResult<Order> {
    let state = store.state();
    let user = state.user_info.as_ref().ok_or(ClientError::AuthRequired)?;
    if state.cart.items.is_empty() {
        return Err(ClientError::Validation("cart is empty".into()));
    }
    let shipping_address = state
        .cart
        .shipping_address
        .clone()
        .ok_or_else(|| ClientError::Validation("shipping address is required".into()))?;
    let payment_method = state
        .cart
        .payment_method
        .clone()
        .ok_or_else(|| ClientError::Validation("payment method is required".into()))?;

    let totals = state.cart.totals();
    let submission = OrderSubmission {
        order_items: state.cart.items.iter().map(OrderLine::from).collect(),
        shipping_address,
        payment_method: payment_method.to_string(),
        items_price: totals.items_price,
        shipping_price: totals.shipping_price,
        tax_price: totals.tax_price,
        total_price: totals.total_price,
    };
    let token = user.token.clone();

    let created = catalog.create_order(&token, &submission).await?;
    store.dispatch(Action::CartClear);
    tracing::info!(
        order_id = %created.order.id,
        total = %format_cents(created.order.total_price),
        "order placed"
    );
    Ok(created.order)
}

pub async fn submit_review<S: Storage, C: CatalogService>(
    store: &Store<S>,
    catalog: &C,
    product_id: Uuid,
    review: ReviewRequest,
) -> ClientResult<ReviewCreated> {
    let user = store
        .state()
        .user_info
        .as_ref()
        .ok_or(ClientError::AuthRequired)?;
    if review.comment.trim().is_empty() || !(1..=5).contains(&review.rating) {
        return Err(ClientError::Validation(
            "Please enter comment and rating".into(),
        ));
    }
    catalog.create_review(&user.token, product_id, &review).await
}

pub async fn order_history<S: Storage, C: CatalogService>(
    store: &Store<S>,
    catalog: &C,
) -> ClientResult<Vec<Order>> {
    let user = store
        .state()
        .user_info
        .as_ref()
        .ok_or(ClientError::AuthRequired)?;
    catalog.my_orders(&user.token).await
}

pub async fn sign_in<S: Storage, C: CatalogService>(
    store: &mut Store<S>,
    catalog: &C,
    email: &str,
    password: &str,
) -> ClientResult<UserInfo> {
    let user = catalog
        .signin(&SigninRequest {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await?;
    store.dispatch(Action::UserSignin(user.clone()));
    Ok(user)
}

pub fn sign_out<S: Storage>(store: &mut Store<S>) -> bool {
    store.dispatch(Action::UserSignout)
}
