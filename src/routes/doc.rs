use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{SigninRequest, SignupRequest},
        orders::{OrderCreated, OrderSubmission},
        products::{ReviewCreated, ReviewRequest},
    },
    models::{Order, OrderLine, Product, Review, ShippingAddress, UserInfo},
    query::SearchPage,
    response::{ApiResponse, Meta},
    routes::{auth, health, orders, params, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::signup,
        auth::signin,
        products::search_products,
        products::list_categories,
        products::list_brands,
        products::new_products,
        products::best_sellers,
        products::products_in_category,
        products::get_product_by_slug,
        products::get_product,
        products::create_review,
        orders::create_order,
        orders::list_my_orders,
        orders::get_order
    ),
    components(
        schemas(
            Product,
            Review,
            Order,
            OrderLine,
            ShippingAddress,
            UserInfo,
            SignupRequest,
            SigninRequest,
            ReviewRequest,
            ReviewCreated,
            OrderSubmission,
            OrderCreated,
            params::Pagination,
            health::HealthData,
            Meta,
            SearchPage<Product>,
            ApiResponse<Vec<Order>>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog search, product detail and reviews"),
        (name = "Orders", description = "Order placement and history"),
        (name = "Auth", description = "Sign up and sign in"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
