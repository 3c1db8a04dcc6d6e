use futures::TryStreamExt as _;
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, Executor, Pool};
use tracing::debug;

use crate::{ChosenDB, Error, error::Result, rating};

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateProduct {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
}

/// Product as seen by the review subsystem, only the rating fields are owned here.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub avg_rating: f64,
    pub reviews_count: i64,
    pub version: i64,
    pub created: time::PrimitiveDateTime,
    pub modified: time::PrimitiveDateTime,
}

impl Product {
    /// Average rating rounded to whole stars.
    pub fn stars(&self) -> i64 {
        self.avg_rating.round() as i64
    }
}

pub type ProductRepository = ProductRepositoryImpl<Pool<ChosenDB>>;

pub struct ProductRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> ProductRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB> + Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateProduct) -> Result<Product> {
        payload.validate()?;
        let result = sqlx::query("INSERT INTO product (name, version) VALUES (?, 1)")
            .bind(&payload.name)
            .execute(&self.executor)
            .await?;

        let id = result.last_insert_rowid();
        debug!("Created product {id}");
        self.get(id).await
    }

    pub async fn get(&self, id: i64) -> Result<Product> {
        get(id, &self.executor).await
    }

    pub async fn avg_rating(&self, id: i64) -> Result<f64> {
        sqlx::query_scalar("SELECT avg_rating FROM product WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::RecordNotFound("Product".to_string()))
    }

    /// Writes rating directly, normally it is maintained by review mutations.
    pub async fn set_avg_rating(&self, id: i64, value: f64) -> Result<()> {
        let res = sqlx::query(
            "UPDATE product SET avg_rating = ?, modified = datetime('now') WHERE id = ?",
        )
        .bind(value)
        .bind(id)
        .execute(&self.executor)
        .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound("Product".to_string()))
        } else {
            Ok(())
        }
    }

    pub async fn recalculate_rating(&self, id: i64) -> Result<Product> {
        let mut tx = self.executor.begin().await?;
        rating::recalculate_product_rating(&mut *tx, id).await?;
        let product = get(id, &mut *tx).await?;
        tx.commit().await?;
        Ok(product)
    }

    pub async fn list_ids(&self) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM product ORDER BY id")
            .fetch(&self.executor)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(ids)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM product WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound("Product".to_string()))
        } else {
            Ok(())
        }
    }
}

pub(crate) async fn get<'c, E>(id: i64, executor: E) -> Result<Product>
where
    E: Executor<'c, Database = ChosenDB>,
{
    sqlx::query_as::<_, Product>("SELECT * FROM product WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| Error::RecordNotFound("Product".to_string()))
}
