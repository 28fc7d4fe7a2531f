use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{ReviewCreated, ReviewRequest},
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        products::{ActiveModel as ProductActive, Column, Entity as Products, Model as ProductModel},
        reviews::{
            ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews,
            Model as ReviewModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Product, Review},
    query::{Facet, FilterState, SearchPage, SortOrder},
    state::AppState,
};

pub async fn search_products(
    state: &AppState,
    filter: &FilterState,
) -> AppResult<SearchPage<Product>> {
    let mut condition = Condition::all();

    if let Facet::Only(search) = filter.query() {
        let pattern = format!("%{}%", escape_like(search));
        condition = condition.add(Expr::col(Column::Name).ilike(pattern));
    }
    if let Facet::Only(category) = filter.category() {
        condition = condition.add(Column::Category.eq(category.as_str()));
    }
    if let Facet::Only(brand) = filter.brand() {
        condition = condition.add(Column::Brand.eq(brand.as_str()));
    }
    if let Some((min, max)) = filter.price().bounds_cents() {
        condition = condition.add(Column::Price.between(min, max));
    }
    if let Facet::Only(stars) = filter.rating() {
        condition = condition.add(Column::Rating.gte(f64::from(stars)));
    }

    let mut finder = Products::find().filter(condition);
    finder = match filter.order() {
        SortOrder::Newest => finder.order_by_desc(Column::CreatedAt),
        SortOrder::Lowest => finder.order_by_asc(Column::Price),
        SortOrder::Highest => finder.order_by_desc(Column::Price),
        SortOrder::TopRated => finder.order_by_desc(Column::Rating),
    };
    // stable paging across equal sort keys
    finder = finder.order_by_asc(Column::Id);

    let total = finder.clone().count(&state.orm).await?;

    let items = finder
        .limit(u64::from(filter.page_size()))
        .offset(filter.offset())
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    tracing::debug!(filter = %filter, total, "product search");
    Ok(SearchPage::new(items, filter, total))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<Product> {
    Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_from_entity)
        .ok_or(AppError::NotFound)
}

pub async fn get_product_by_slug(state: &AppState, slug: &str) -> AppResult<Product> {
    Products::find()
        .filter(Column::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .map(product_from_entity)
        .ok_or(AppError::NotFound)
}

/// Number of products in each storefront showcase list.
pub const SHOWCASE_SIZE: u64 = 8;

/// Latest additions to the catalog.
pub async fn new_products(state: &AppState) -> AppResult<Vec<Product>> {
    let products = Products::find()
        .order_by_desc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .limit(SHOWCASE_SIZE)
        .all(&state.orm)
        .await?;
    Ok(products.into_iter().map(product_from_entity).collect())
}

/// Products ranked by units ordered. When fewer than [`SHOWCASE_SIZE`]
/// products have sold, the list is topped up with the best rated ones.
pub async fn best_sellers(state: &AppState) -> AppResult<Vec<Product>> {
    let sold: Vec<(Uuid, i64)> = OrderItems::find()
        .select_only()
        .column(OrderItemCol::ProductId)
        .column_as(Expr::col(OrderItemCol::Quantity).sum(), "units")
        .group_by(OrderItemCol::ProductId)
        .order_by(Expr::cust("units"), Order::Desc)
        .order_by_asc(OrderItemCol::ProductId)
        .limit(SHOWCASE_SIZE)
        .into_tuple()
        .all(&state.orm)
        .await?;
    let ranked: Vec<Uuid> = sold.into_iter().map(|(id, _)| id).collect();

    let mut products = Products::find()
        .filter(Column::Id.is_in(ranked.clone()))
        .all(&state.orm)
        .await?;
    products.sort_by_key(|p| ranked.iter().position(|id| *id == p.id));

    let missing = SHOWCASE_SIZE.saturating_sub(products.len() as u64);
    if missing > 0 {
        let top_rated = Products::find()
            .filter(Column::Id.is_not_in(ranked))
            .order_by_desc(Column::Rating)
            .order_by_desc(Column::NumReviews)
            .order_by_asc(Column::Id)
            .limit(missing)
            .all(&state.orm)
            .await?;
        products.extend(top_rated);
    }

    Ok(products.into_iter().map(product_from_entity).collect())
}

/// Best rated products of `category`, used for suggestions on the detail page.
pub async fn products_in_category(state: &AppState, category: &str) -> AppResult<Vec<Product>> {
    let products = Products::find()
        .filter(Column::Category.eq(category))
        .order_by_desc(Column::Rating)
        .order_by_asc(Column::Id)
        .limit(SHOWCASE_SIZE)
        .all(&state.orm)
        .await?;
    Ok(products.into_iter().map(product_from_entity).collect())
}

pub async fn list_categories(state: &AppState) -> AppResult<Vec<String>> {
    distinct_values(state, Column::Category).await
}

pub async fn list_brands(state: &AppState) -> AppResult<Vec<String>> {
    distinct_values(state, Column::Brand).await
}

async fn distinct_values(state: &AppState, column: Column) -> AppResult<Vec<String>> {
    let values = Products::find()
        .select_only()
        .column(column)
        .distinct()
        .order_by_asc(column)
        .into_tuple::<String>()
        .all(&state.orm)
        .await?;
    Ok(values)
}

/// Adds the caller's review and refreshes the product's rating summary.
/// A user may review a product once.
pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: ReviewRequest,
) -> AppResult<ReviewCreated> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest("rating must be between 1 and 5".into()));
    }
    let comment = payload.comment.trim().to_string();
    if comment.is_empty() {
        return Err(AppError::BadRequest("comment is required".into()));
    }

    let txn = state.orm.begin().await?;

    let product = Products::find_by_id(product_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let existing = Reviews::find()
        .filter(
            Condition::all()
                .add(ReviewCol::ProductId.eq(product_id))
                .add(ReviewCol::UserId.eq(user.user_id)),
        )
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest("You already submitted a review".into()));
    }

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        user_id: Set(user.user_id),
        name: Set(user.name.clone()),
        rating: Set(payload.rating),
        comment: Set(comment),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let ratings: Vec<i32> = Reviews::find()
        .select_only()
        .column(ReviewCol::Rating)
        .filter(ReviewCol::ProductId.eq(product_id))
        .into_tuple()
        .all(&txn)
        .await?;
    let (num_reviews, rating) = rating_summary(&ratings);

    let mut active: ProductActive = product.into();
    active.num_reviews = Set(num_reviews);
    active.rating = Set(rating);
    active.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "review_create",
        "reviews",
        serde_json::json!({ "product_id": product_id, "review_id": review.id }),
    )
    .await;

    Ok(ReviewCreated {
        review: review_from_entity(review),
        num_reviews,
        rating,
    })
}

/// Review count and mean rating.
pub fn rating_summary(ratings: &[i32]) -> (i32, f64) {
    if ratings.is_empty() {
        return (0, 0.0);
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    let count = ratings.len();
    (
        i32::try_from(count).unwrap_or(i32::MAX),
        sum as f64 / count as f64,
    )
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        slug: model.slug,
        image: model.image,
        brand: model.brand,
        category: model.category,
        description: model.description,
        price: model.price,
        count_in_stock: model.count_in_stock,
        rating: model.rating,
        num_reviews: model.num_reviews,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn review_from_entity(model: ReviewModel) -> Review {
    Review {
        id: model.id,
        product_id: model.product_id,
        user_id: model.user_id,
        name: model.name,
        rating: model.rating,
        comment: model.comment,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
