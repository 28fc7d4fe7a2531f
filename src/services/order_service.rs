use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{OrderCreated, OrderSubmission},
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderLine, ShippingAddress},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

/// Stores a checkout submission as sent by the storefront.
///
/// Lines, address, payment method and totals are persisted verbatim; stock
/// is neither checked nor reserved here.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: OrderSubmission,
) -> AppResult<OrderCreated> {
    if payload.order_items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }
    if payload.order_items.iter().any(|line| line.quantity == 0) {
        return Err(AppError::BadRequest("Cart has invalid quantity".into()));
    }
    let missing = payload.shipping_address.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::BadRequest(format!(
            "shipping address is missing {}",
            missing.join(", ")
        )));
    }
    if payload.payment_method.trim().is_empty() {
        return Err(AppError::BadRequest("payment method is required".into()));
    }

    let product_ids: Vec<Uuid> = payload
        .order_items
        .iter()
        .map(|line| line.product_id)
        .collect();
    let known = Products::find()
        .filter(ProdCol::Id.is_in(product_ids.clone()))
        .count(&state.orm)
        .await?;
    let distinct = {
        let mut ids = product_ids;
        ids.sort();
        ids.dedup();
        ids.len() as u64
    };
    if known != distinct {
        return Err(AppError::BadRequest("order references unknown products".into()));
    }

    let shipping_address = serde_json::to_value(&payload.shipping_address)
        .map_err(|e| AppError::Internal(e.into()))?;

    let txn = state.orm.begin().await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        shipping_address: Set(shipping_address),
        payment_method: Set(payload.payment_method.clone()),
        items_price: Set(payload.items_price),
        shipping_price: Set(payload.shipping_price),
        tax_price: Set(payload.tax_price),
        total_price: Set(payload.total_price),
        is_paid: Set(false),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(payload.order_items.len());
    for (position, line) in payload.order_items.iter().enumerate() {
        let quantity = i32::try_from(line.quantity)
            .map_err(|_| AppError::BadRequest("Cart has invalid quantity".into()))?;
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            name: Set(line.name.clone()),
            slug: Set(line.slug.clone()),
            image: Set(line.image.clone()),
            quantity: Set(quantity),
            price: Set(line.price),
            position: Set(position as i32),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(item);
    }

    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id, "total_price": order.total_price }),
    )
    .await;

    Ok(OrderCreated {
        order: order_from_entity(order, items)?,
    })
}

pub async fn list_my_orders(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let mut orders = Vec::with_capacity(models.len());
    for model in models {
        let items = load_items(state, model.id).await?;
        orders.push(order_from_entity(model, items)?);
    }

    Ok(ApiResponse::success(
        "Ok",
        orders,
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<Order> {
    let mut condition = Condition::all().add(OrderCol::Id.eq(id));
    if !user.is_admin() {
        condition = condition.add(OrderCol::UserId.eq(user.user_id));
    }
    let order = Orders::find()
        .filter(condition)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = load_items(state, order.id).await?;
    order_from_entity(order, items)
}

async fn load_items(state: &AppState, order_id: Uuid) -> AppResult<Vec<OrderItemModel>> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::Position)
        .all(&state.orm)
        .await?;
    Ok(items)
}

fn order_from_entity(model: OrderModel, items: Vec<OrderItemModel>) -> AppResult<Order> {
    let shipping_address: ShippingAddress = serde_json::from_value(model.shipping_address)
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        order_items: items.into_iter().map(line_from_entity).collect(),
        shipping_address,
        payment_method: model.payment_method,
        items_price: model.items_price,
        shipping_price: model.shipping_price,
        tax_price: model.tax_price,
        total_price: model.total_price,
        is_paid: model.is_paid,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

fn line_from_entity(model: OrderItemModel) -> OrderLine {
    OrderLine {
        product_id: model.product_id,
        name: model.name,
        slug: model.slug,
        image: model.image,
        price: model.price,
        quantity: u32::try_from(model.quantity).unwrap_or(0),
    }
}
