#![allow(dead_code)]

use fake::{
    Fake as _,
    faker::{lorem::en::Paragraph, name::en::Name},
};
use prs_dal::{
    product::{CreateProduct, Product, ProductRepositoryImpl},
    review::CreateReview,
};
use sqlx::Executor;

pub type TestPool = sqlx::Pool<sqlx::Sqlite>;

pub async fn init_db() -> TestPool {
    const DB_URL: &str = "sqlite::memory:";
    let conn = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect(DB_URL)
        .await
        .unwrap();
    conn.execute("PRAGMA foreign_keys = ON").await.unwrap();
    prs_dal::MIGRATOR.run(&conn).await.unwrap();
    conn
}

pub async fn create_product(pool: &TestPool) -> Product {
    ProductRepositoryImpl::new(pool.clone())
        .create(CreateProduct {
            name: "Ruby on Rails Tote".to_string(),
        })
        .await
        .unwrap()
}

/// Valid review payload with generated author name and text.
pub fn review_for(product_id: i64, rating: i64) -> CreateReview {
    let name: String = Name().fake();
    let body: String = Paragraph(1..3).fake();
    CreateReview::new(product_id, name, rating, body).by_user(1)
}

pub fn approved_review_for(product_id: i64, rating: i64) -> CreateReview {
    review_for(product_id, rating).with_approval(true)
}
