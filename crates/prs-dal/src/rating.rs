//! Rating aggregation.
//!
//! A product's `avg_rating` and `reviews_count` are derived from its approved
//! reviews and are rewritten by [`recalculate_product_rating`], which review
//! mutations call inside their own transaction. Feedback stars of a review are
//! never stored, they are computed by [`feedback_aggregate`] on every read.

use serde::Serialize;
use tracing::debug;

use crate::{ChosenConnection, ChosenDB, Error, error::Result};

/// Count and sum of a set of ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, sqlx::FromRow)]
pub struct RatingAggregate {
    pub count: i64,
    pub total: i64,
}

impl RatingAggregate {
    pub fn from_ratings(ratings: impl IntoIterator<Item = i64>) -> Self {
        ratings
            .into_iter()
            .fold(RatingAggregate::default(), |acc, rating| RatingAggregate {
                count: acc.count + 1,
                total: acc.total + rating,
            })
    }

    /// Arithmetic mean, `0.0` for no ratings.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total as f64 / self.count as f64
        }
    }
}

/// Recomputes `avg_rating` and `reviews_count` of a product from its approved reviews.
///
/// Takes a connection so it can run inside the caller's transaction.
pub async fn recalculate_product_rating(
    conn: &mut ChosenConnection,
    product_id: i64,
) -> Result<RatingAggregate> {
    let aggregate: RatingAggregate = sqlx::query_as(
        "SELECT count(*) AS count, COALESCE(SUM(rating), 0) AS total FROM review WHERE product_id = ? AND approved = 1",
    )
    .bind(product_id)
    .fetch_one(&mut *conn)
    .await?;

    store_product_rating(&mut *conn, product_id, aggregate).await?;
    debug!(
        "Product {product_id} rating recalculated: {} from {} approved reviews",
        aggregate.average(),
        aggregate.count
    );
    Ok(aggregate)
}

async fn store_product_rating<'c, E>(
    executor: E,
    product_id: i64,
    aggregate: RatingAggregate,
) -> Result<()>
where
    E: sqlx::Executor<'c, Database = ChosenDB>,
{
    let res = sqlx::query(
        "UPDATE product SET avg_rating = ?, reviews_count = ?, modified = datetime('now') WHERE id = ?",
    )
    .bind(aggregate.average())
    .bind(aggregate.count)
    .bind(product_id)
    .execute(executor)
    .await?;

    if res.rows_affected() == 0 {
        Err(Error::RecordNotFound("Product".to_string()))
    } else {
        Ok(())
    }
}

pub async fn feedback_aggregate<'c, E>(executor: E, review_id: i64) -> Result<RatingAggregate>
where
    E: sqlx::Executor<'c, Database = ChosenDB>,
{
    let aggregate = sqlx::query_as(
        "SELECT count(*) AS count, COALESCE(SUM(rating), 0) AS total FROM feedback_review WHERE review_id = ?",
    )
    .bind(review_id)
    .fetch_one(executor)
    .await?;
    Ok(aggregate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_average_is_zero() {
        let aggregate = RatingAggregate::from_ratings(std::iter::empty());
        assert_eq!(aggregate, RatingAggregate::default());
        assert_eq!(aggregate.average(), 0.0);
    }

    #[test]
    fn test_average() {
        assert_eq!(RatingAggregate::from_ratings([5, 1]).average(), 3.0);
        assert_eq!(RatingAggregate::from_ratings([1, 2, 3]).average(), 2.0);
        let aggregate = RatingAggregate::from_ratings([5, 4]);
        assert_eq!(aggregate.count, 2);
        assert_eq!(aggregate.total, 9);
        assert_eq!(aggregate.average(), 4.5);
    }
}
