use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::products::{ReviewCreated, ReviewRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Product,
    query::{FilterState, SearchPage},
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", get(search_products))
        .route("/categories", get(list_categories))
        .route("/brands", get(list_brands))
        .route("/new-products", get(new_products))
        .route("/best-sellers", get(best_sellers))
        .route("/category/{category}", get(products_in_category))
        .route("/slug/{slug}", get(get_product_by_slug))
        .route("/{id}", get(get_product))
        .route("/{id}/reviews", post(create_review))
}

#[utoipa::path(
    get,
    path = "/api/products/search",
    params(
        ("query" = Option<String>, Query, description = "Name substring, `all` for any"),
        ("category" = Option<String>, Query, description = "Category, `all` for any"),
        ("brand" = Option<String>, Query, description = "Brand, `all` for any"),
        ("price" = Option<String>, Query, description = "Price bucket: all, 1-50, 51-200, 201-1000"),
        ("rating" = Option<String>, Query, description = "Minimum rating 0-5, `all` for any"),
        ("order" = Option<String>, Query, description = "newest, lowest, highest or toprated"),
        ("page" = Option<u32>, Query, description = "Page number, default 1"),
        ("pageSize" = Option<u32>, Query, description = "Items per page, default 12"),
    ),
    responses(
        (status = 200, description = "One page of matching products", body = SearchPage<Product>)
    ),
    tag = "Products"
)]
pub async fn search_products(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<SearchPage<Product>>> {
    let filter = FilterState::parse(raw.as_deref().unwrap_or_default());
    let page = product_service::search_products(&state, &filter).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/products/categories",
    responses(
        (status = 200, description = "Distinct categories", body = Vec<String>)
    ),
    tag = "Products"
)]
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(product_service::list_categories(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/products/brands",
    responses(
        (status = 200, description = "Distinct brands", body = Vec<String>)
    ),
    tag = "Products"
)]
pub async fn list_brands(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(product_service::list_brands(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/products/new-products",
    responses(
        (status = 200, description = "Most recently added products", body = Vec<Product>)
    ),
    tag = "Products"
)]
pub async fn new_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(product_service::new_products(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/products/best-sellers",
    responses(
        (status = 200, description = "Products ranked by units ordered", body = Vec<Product>)
    ),
    tag = "Products"
)]
pub async fn best_sellers(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(product_service::best_sellers(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/products/category/{category}",
    params(
        ("category" = String, Path, description = "Exact category name")
    ),
    responses(
        (status = 200, description = "Best rated products of the category", body = Vec<Product>)
    ),
    tag = "Products"
)]
pub async fn products_in_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(product_service::products_in_category(&state, &category).await?))
}

#[utoipa::path(
    get,
    path = "/api/products/slug/{slug}",
    params(
        ("slug" = String, Path, description = "Product slug")
    ),
    responses(
        (status = 200, description = "Get product", body = Product),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Product>> {
    Ok(Json(product_service::get_product_by_slug(&state, &slug).await?))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get product", body = Product),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    Ok(Json(product_service::get_product(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/reviews",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewCreated),
        (status = 400, description = "Invalid or duplicate review"),
        (status = 401, description = "Sign in required"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewRequest>,
) -> AppResult<(axum::http::StatusCode, Json<ReviewCreated>)> {
    let created = product_service::create_review(&state, &user, id, payload).await?;
    Ok((axum::http::StatusCode::CREATED, Json(created)))
}
