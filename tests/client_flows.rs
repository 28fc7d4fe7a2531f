mod common;

use std::{collections::HashMap, sync::Mutex};

use chrono::Utc;
use common::{address, line, payment_methods, product, user};
use storefront::{
    client::{
        CatalogService, ClientError, ClientResult, MemoryStorage, Store,
        flows,
        store::{Action, PaymentMethod},
    },
    dto::{
        auth::SigninRequest,
        orders::{OrderCreated, OrderSubmission},
        products::{ReviewCreated, ReviewRequest},
    },
    models::{Order, Product, Review, UserInfo},
    query::{FilterState, SearchPage},
};
use uuid::Uuid;

#[derive(Default)]
struct FakeCatalog {
    products: Mutex<HashMap<Uuid, Product>>,
    orders: Mutex<Vec<OrderSubmission>>,
    reject_orders: bool,
}

impl FakeCatalog {
    fn with_products(products: &[&Product]) -> Self {
        let catalog = Self::default();
        {
            let mut map = catalog.products.lock().unwrap();
            for product in products {
                map.insert(product.id, (*product).clone());
            }
        }
        catalog
    }

    fn set_stock(&self, id: Uuid, count_in_stock: i32) {
        if let Some(product) = self.products.lock().unwrap().get_mut(&id) {
            product.count_in_stock = count_in_stock;
        }
    }

    fn submitted(&self) -> Vec<OrderSubmission> {
        self.orders.lock().unwrap().clone()
    }
}

impl CatalogService for FakeCatalog {
    async fn search(&self, filter: &FilterState) -> ClientResult<SearchPage<Product>> {
        let products: Vec<Product> = self.products.lock().unwrap().values().cloned().collect();
        let count = products.len() as u64;
        Ok(SearchPage::new(products, filter, count))
    }

    async fn product(&self, id: Uuid) -> ClientResult<Product> {
        self.products
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| ClientError::service(Some(404), "Product not found"))
    }

    async fn product_by_slug(&self, slug: &str) -> ClientResult<Product> {
        self.products
            .lock()
            .unwrap()
            .values()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or_else(|| ClientError::service(Some(404), "Product not found"))
    }

    async fn new_products(&self) -> ClientResult<Vec<Product>> {
        let mut products: Vec<Product> = self.products.lock().unwrap().values().cloned().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn best_sellers(&self) -> ClientResult<Vec<Product>> {
        let mut products: Vec<Product> = self.products.lock().unwrap().values().cloned().collect();
        products.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        Ok(products)
    }

    async fn products_in_category(&self, category: &str) -> ClientResult<Vec<Product>> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.category == category)
            .cloned()
            .collect())
    }

    async fn categories(&self) -> ClientResult<Vec<String>> {
        Ok(vec!["Shampoo".into()])
    }

    async fn brands(&self) -> ClientResult<Vec<String>> {
        Ok(vec!["Salon Pro".into()])
    }

    async fn create_review(
        &self,
        _token: &str,
        product_id: Uuid,
        review: &ReviewRequest,
    ) -> ClientResult<ReviewCreated> {
        Ok(ReviewCreated {
            review: Review {
                id: Uuid::new_v4(),
                product_id,
                user_id: Uuid::new_v4(),
                name: "Jane".into(),
                rating: review.rating,
                comment: review.comment.clone(),
                created_at: Utc::now(),
            },
            num_reviews: 1,
            rating: f64::from(review.rating),
        })
    }

    async fn create_order(&self, _token: &str, order: &OrderSubmission) -> ClientResult<OrderCreated> {
        if self.reject_orders {
            return Err(ClientError::service(Some(500), "database unavailable"));
        }
        self.orders.lock().unwrap().push(order.clone());
        Ok(OrderCreated {
            order: Order {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                order_items: order.order_items.clone(),
                shipping_address: order.shipping_address.clone(),
                payment_method: order.payment_method.clone(),
                items_price: order.items_price,
                shipping_price: order.shipping_price,
                tax_price: order.tax_price,
                total_price: order.total_price,
                is_paid: false,
                created_at: Utc::now(),
            },
        })
    }

    async fn my_orders(&self, _token: &str) -> ClientResult<Vec<Order>> {
        Ok(Vec::new())
    }

    async fn signin(&self, credentials: &SigninRequest) -> ClientResult<UserInfo> {
        if credentials.password != "secret" {
            return Err(ClientError::service(Some(400), "Invalid email or password"));
        }
        Ok(UserInfo {
            email: credentials.email.clone(),
            ..user()
        })
    }
}

fn store() -> Store<MemoryStorage> {
    Store::open(MemoryStorage::new(), payment_methods())
}

fn checkout_ready(items: &[(&Product, u32)]) -> Store<MemoryStorage> {
    let mut store = store();
    store.dispatch(Action::UserSignin(user()));
    for (product, quantity) in items {
        store.dispatch(Action::CartAddItem(line(product, *quantity)));
    }
    flows::save_checkout_details(&mut store, address(), PaymentMethod::new("PayPal"))
        .expect("checkout details");
    store
}

#[tokio::test]
async fn add_beyond_stock_is_rejected() {
    let mask = product("Hair Mask", 64_00, 2);
    let catalog = FakeCatalog::with_products(&[&mask]);
    let mut store = store();

    assert_eq!(flows::add_to_cart(&mut store, &catalog, &mask, 2).await.unwrap(), 2);
    let before = store.state().clone();

    let err = flows::add_to_cart(&mut store, &catalog, &mask, 1)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::StockConflict { requested: 3, in_stock: 2, .. }
    ));
    assert_eq!(store.state(), &before);
}

#[tokio::test]
async fn oversized_add_is_rejected_without_touching_the_cart() {
    let comb = product("Wide Comb", 4_00, i32::MAX);
    let catalog = FakeCatalog::with_products(&[&comb]);
    let mut store = store();

    assert_eq!(flows::add_to_cart(&mut store, &catalog, &comb, 5).await.unwrap(), 5);
    let before = store.state().clone();

    let err = flows::add_to_cart(&mut store, &catalog, &comb, u32::MAX)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(store.state(), &before);
    assert_eq!(store.state().cart.quantity_of(comb.id), 5);
}

#[tokio::test]
async fn stock_is_read_from_the_catalog_not_the_listing() {
    let dryer = product("Dryer", 149_00, 10);
    let catalog = FakeCatalog::with_products(&[&dryer]);
    catalog.set_stock(dryer.id, 1);
    let mut store = store();

    let err = flows::add_to_cart(&mut store, &catalog, &dryer, 2).await.unwrap_err();
    assert!(matches!(err, ClientError::StockConflict { in_stock: 1, .. }));

    flows::add_to_cart(&mut store, &catalog, &dryer, 1).await.unwrap();
    assert_eq!(store.state().cart.items[0].count_in_stock, 1);
}

#[tokio::test]
async fn update_quantity_replaces_the_line() {
    let shampoo = product("Shampoo", 24_99, 5);
    let catalog = FakeCatalog::with_products(&[&shampoo]);
    let mut store = store();

    flows::add_to_cart(&mut store, &catalog, &shampoo, 3).await.unwrap();
    flows::update_cart_quantity(&mut store, &catalog, shampoo.id, 1).await.unwrap();
    assert_eq!(store.state().cart.quantity_of(shampoo.id), 1);

    let err = flows::update_cart_quantity(&mut store, &catalog, shampoo.id, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(flows::remove_from_cart(&mut store, shampoo.id));
    assert!(store.state().cart.items.is_empty());
}

#[tokio::test]
async fn unknown_product_is_a_service_error() {
    let ghost = product("Ghost", 1_00, 5);
    let catalog = FakeCatalog::default();
    let mut store = store();

    let err = flows::add_to_cart(&mut store, &catalog, &ghost, 1).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(store.state().cart.items.is_empty());
}

#[test]
fn toggling_the_wishlist_twice_removes_the_item() {
    let serum = product("Serum", 38_75, 0);
    let mut store = store();

    assert!(flows::toggle_wishlist(&mut store, &serum));
    assert_eq!(store.state().wishlist.items.len(), 1);
    assert!(!flows::toggle_wishlist(&mut store, &serum));
    assert!(store.state().wishlist.items.is_empty());
}

#[test]
fn checkout_details_need_sign_in_and_valid_fields() {
    let mut store = store();
    let err = flows::save_checkout_details(&mut store, address(), PaymentMethod::new("PayPal"))
        .unwrap_err();
    assert!(matches!(err, ClientError::AuthRequired));

    store.dispatch(Action::UserSignin(user()));
    let mut partial = address();
    partial.postal_code.clear();
    let err = flows::save_checkout_details(&mut store, partial, PaymentMethod::new("PayPal"))
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(ref msg) if msg.contains("postalCode")));

    let err = flows::save_checkout_details(&mut store, address(), PaymentMethod::new("Cash"))
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(store.state().cart.shipping_address.is_none());

    flows::save_checkout_details(&mut store, address(), PaymentMethod::new("Stripe")).unwrap();
    assert_eq!(
        store.state().cart.payment_method,
        Some(PaymentMethod::new("Stripe"))
    );
}

#[tokio::test]
async fn place_order_requires_sign_in() {
    let catalog = FakeCatalog::default();
    let mut store = store();
    let err = flows::place_order(&mut store, &catalog).await.unwrap_err();
    assert!(matches!(err, ClientError::AuthRequired));
    assert!(catalog.submitted().is_empty());
}

#[tokio::test]
async fn place_order_rejects_empty_cart() {
    let catalog = FakeCatalog::default();
    let mut store = checkout_ready(&[]);
    let err = flows::place_order(&mut store, &catalog).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn place_order_submits_totals_and_clears_cart() {
    let a = product("A", 30_00, 10);
    let b = product("B", 25_00, 10);
    let catalog = FakeCatalog::with_products(&[&a, &b]);
    let mut store = checkout_ready(&[(&a, 2), (&b, 1)]);

    let order = flows::place_order(&mut store, &catalog).await.unwrap();
    assert_eq!(order.total_price, 107_75);

    let submitted = catalog.submitted();
    assert_eq!(submitted.len(), 1);
    let sent = &submitted[0];
    assert_eq!(sent.order_items.len(), 2);
    assert_eq!(sent.order_items[0].product_id, a.id);
    assert_eq!(sent.items_price, 85_00);
    assert_eq!(sent.shipping_price, 10_00);
    assert_eq!(sent.tax_price, 12_75);
    assert_eq!(sent.payment_method, "PayPal");
    assert_eq!(sent.shipping_address, address());

    let cart = &store.state().cart;
    assert!(cart.items.is_empty());
    assert!(cart.shipping_address.is_some());
    assert!(cart.payment_method.is_some());
}

#[tokio::test]
async fn failed_order_keeps_the_cart() {
    let a = product("A", 30_00, 10);
    let mut catalog = FakeCatalog::with_products(&[&a]);
    catalog.reject_orders = true;
    let mut store = checkout_ready(&[(&a, 1)]);
    let before = store.state().clone();

    let err = flows::place_order(&mut store, &catalog).await.unwrap_err();
    assert!(matches!(err, ClientError::Service { status: Some(500), .. }));
    assert_eq!(store.state(), &before);
}

#[tokio::test]
async fn review_needs_comment_and_rating() {
    let catalog = FakeCatalog::default();
    let mut store = store();
    let product_id = Uuid::new_v4();
    let review = ReviewRequest {
        rating: 5,
        comment: "Great".into(),
    };

    let err = flows::submit_review(&store, &catalog, product_id, review.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::AuthRequired));

    store.dispatch(Action::UserSignin(user()));
    let blank = ReviewRequest {
        rating: 4,
        comment: "  ".into(),
    };
    assert!(matches!(
        flows::submit_review(&store, &catalog, product_id, blank).await,
        Err(ClientError::Validation(_))
    ));
    let unrated = ReviewRequest {
        rating: 0,
        comment: "ok".into(),
    };
    assert!(flows::submit_review(&store, &catalog, product_id, unrated).await.is_err());

    let created = flows::submit_review(&store, &catalog, product_id, review).await.unwrap();
    assert_eq!(created.review.product_id, product_id);
    assert_eq!(created.num_reviews, 1);
}

#[tokio::test]
async fn sign_in_and_out() {
    let catalog = FakeCatalog::default();
    let mut store = store();

    let err = flows::sign_in(&mut store, &catalog, "jane@example.com", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Service { status: Some(400), .. }));
    assert!(!store.is_signed_in());

    let signed = flows::sign_in(&mut store, &catalog, "jane@example.com", "secret")
        .await
        .unwrap();
    assert_eq!(signed.email, "jane@example.com");
    assert!(store.is_signed_in());
    assert!(flows::order_history(&store, &catalog).await.unwrap().is_empty());

    assert!(flows::sign_out(&mut store));
    assert!(matches!(
        flows::order_history(&store, &catalog).await,
        Err(ClientError::AuthRequired)
    ));
}

#[tokio::test]
async fn load_search_returns_the_catalog_page() {
    let catalog = FakeCatalog::with_products(&[&product("A", 1_00, 1), &product("B", 2_00, 1)]);
    let filter = FilterState::parse("pageSize=1");
    let page = flows::load_search(&catalog, &filter).await.unwrap();
    assert_eq!(page.count_products, 2);
    assert_eq!(page.pages, 2);
}

#[tokio::test]
async fn home_sections_come_from_the_catalog() {
    let mut older = product("Old Shampoo", 10_00, 3);
    older.created_at = Utc::now() - chrono::Duration::days(30);
    older.rating = 5.0;
    let fresh = product("Fresh Shampoo", 12_00, 3);
    let catalog = FakeCatalog::with_products(&[&older, &fresh]);

    let home = flows::load_home(&catalog).await.unwrap();
    assert_eq!(home.new_products[0].id, fresh.id);
    assert_eq!(home.best_sellers[0].id, older.id);
    assert_eq!(home.new_products.len(), 2);
}

#[tokio::test]
async fn suggestions_exclude_the_viewed_product() {
    let viewed = product("Argan Shampoo", 24_99, 5);
    let sibling = product("Mint Shampoo", 19_99, 5);
    let mut dryer = product("Dryer", 149_00, 5);
    dryer.category = "Tools".into();
    let catalog = FakeCatalog::with_products(&[&viewed, &sibling, &dryer]);

    let suggested = flows::suggested_products(&catalog, &viewed).await.unwrap();
    assert_eq!(suggested.len(), 1);
    assert_eq!(suggested[0].id, sibling.id);
}
