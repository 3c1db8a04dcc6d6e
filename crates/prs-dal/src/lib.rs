pub mod error;
pub mod feedback_review;
pub mod product;
pub mod rating;
pub mod review;

use std::{fmt::Display, str::FromStr as _};

pub use error::Error;
pub use sqlx::Error as SqlxError;
use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::debug;

use crate::error::Result;

pub type ChosenDB = sqlx::Sqlite;
pub type ChosenConnection = sqlx::SqliteConnection;
pub type Pool = sqlx::Pool<ChosenDB>;

pub const MAX_LIMIT: usize = 10_000;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn new_pool(database_url: &str) -> Result<Pool, Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(50)
        .connect_with(options)
        .await?;
    Ok(pool)
}

pub async fn migrate(pool: &Pool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    debug!("Database schema is up to date");
    Ok(())
}

#[derive(Debug, Clone)]
pub enum Order {
    Asc(String),
    Desc(String),
}

impl Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Order::Asc(s) => write!(f, "{}", s),
            Order::Desc(s) => write!(f, "{} DESC", s),
        }
    }
}

impl AsRef<str> for Order {
    fn as_ref(&self) -> &str {
        match self {
            Order::Asc(s) => s.as_str(),
            Order::Desc(s) => s.as_str(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListingParams {
    pub offset: i64,
    pub limit: i64,
    pub order: Option<Vec<Order>>,
}

impl Default for ListingParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: MAX_LIMIT as i64,
            order: None,
        }
    }
}

impl ListingParams {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset,
            limit,
            order: None,
        }
    }

    /// Page is 1 based
    pub fn page(page: i64, page_size: i64) -> Self {
        let page = page.max(1);
        Self::new((page - 1).saturating_mul(page_size), page_size)
    }

    pub fn with_order(mut self, order: Vec<Order>) -> Self {
        self.order = Some(order);
        self
    }

    /// Returns ORDER BY clause, `default_order` is used when no order is requested.
    pub fn ordering(&self, valid_fields: &[&str], default_order: &str) -> Result<String> {
        let ordering = self
            .order
            .as_ref()
            .filter(|o| !o.is_empty())
            .map(|o| {
                o.iter()
                    .map(|o| {
                        if valid_fields.contains(&o.as_ref()) {
                            Ok(o.to_string())
                        } else {
                            Err(Error::InvalidOrderByField(o.as_ref().to_string()))
                        }
                    })
                    .collect::<Result<Vec<String>>>()
                    .map(|o| o.join(", "))
            })
            .transpose()?
            .unwrap_or_else(|| default_order.to_string());
        Ok(format!("ORDER BY {ordering}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        let fields = &["created", "rating"];
        let params = ListingParams::default();
        assert_eq!(
            params.ordering(fields, "created DESC").unwrap(),
            "ORDER BY created DESC"
        );

        let params = ListingParams::default().with_order(vec![
            Order::Desc("rating".into()),
            Order::Asc("created".into()),
        ]);
        assert_eq!(
            params.ordering(fields, "created DESC").unwrap(),
            "ORDER BY rating DESC, created"
        );

        let params = ListingParams::default().with_order(vec![Order::Asc("review".into())]);
        assert!(matches!(
            params.ordering(fields, "created DESC"),
            Err(Error::InvalidOrderByField(f)) if f == "review"
        ));
    }

    #[test]
    fn test_page() {
        let params = ListingParams::page(3, 10);
        assert_eq!(params.offset, 20);
        assert_eq!(params.limit, 10);
        assert_eq!(ListingParams::page(0, 10).offset, 0);

        let params = ListingParams::page(i64::MAX, 10);
        assert_eq!(params.offset, i64::MAX);
        assert_eq!(params.limit, 10);
    }
}
