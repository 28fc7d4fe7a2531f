use storefront::{
    config::AppConfig,
    db::{DbPool, create_orm_conn, create_pool, run_migrations},
    services::auth_service::hash_password,
};
use uuid::Uuid;

struct SeedProduct {
    name: &'static str,
    slug: &'static str,
    brand: &'static str,
    category: &'static str,
    description: &'static str,
    price: i64,
    count_in_stock: i32,
}

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Argan Repair Shampoo",
        slug: "argan-repair-shampoo",
        brand: "Moroccan Glow",
        category: "Shampoo",
        description: "Sulfate free shampoo for dry and damaged hair",
        price: 24_99,
        count_in_stock: 40,
    },
    SeedProduct {
        name: "Silk Protein Conditioner",
        slug: "silk-protein-conditioner",
        brand: "Moroccan Glow",
        category: "Conditioner",
        description: "Daily conditioner that smooths frizz",
        price: 19_50,
        count_in_stock: 25,
    },
    SeedProduct {
        name: "Keratin Hair Mask",
        slug: "keratin-hair-mask",
        brand: "Salon Pro",
        category: "Treatment",
        description: "Weekly deep treatment with keratin",
        price: 64_00,
        count_in_stock: 12,
    },
    SeedProduct {
        name: "Ionic Hair Dryer",
        slug: "ionic-hair-dryer",
        brand: "Salon Pro",
        category: "Tools",
        description: "2000W dryer with cool shot and diffuser",
        price: 149_00,
        count_in_stock: 8,
    },
    SeedProduct {
        name: "Ceramic Straightener",
        slug: "ceramic-straightener",
        brand: "Heatwave",
        category: "Tools",
        description: "Adjustable temperature flat iron",
        price: 289_00,
        count_in_stock: 5,
    },
    SeedProduct {
        name: "Scalp Care Serum",
        slug: "scalp-care-serum",
        brand: "Heatwave",
        category: "Treatment",
        description: "Lightweight serum for a balanced scalp",
        price: 38_75,
        count_in_stock: 0,
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    let pool = create_pool(&config.database_url).await?;

    let admin_id = ensure_user(&pool, "Admin", "admin@example.com", "admin123", "admin").await?;
    let user_id = ensure_user(&pool, "Jane", "user@example.com", "user123", "user").await?;
    seed_products(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &DbPool,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role, name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_products(pool: &DbPool) -> anyhow::Result<()> {
    for product in PRODUCTS {
        sqlx::query(
            r#"
            INSERT INTO products
                (id, name, slug, image, brand, category, description, price, count_in_stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product.name)
        .bind(product.slug)
        .bind(format!("/images/{}.jpg", product.slug))
        .bind(product.brand)
        .bind(product.category)
        .bind(product.description)
        .bind(product.price)
        .bind(product.count_in_stock)
        .execute(pool)
        .await?;
    }

    println!("Seeded {} products", PRODUCTS.len());
    Ok(())
}
