use futures::TryStreamExt as _;
use garde::Validate;
use prs_types::{
    ReviewSettings, ValidationError,
    validate::{check_rating, whole_rating},
};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use sqlx::{Acquire, Executor, Pool};
use tracing::debug;

use crate::{ChosenDB, Error, error::Result};

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateFeedbackReview {
    #[garde(range(min = 1))]
    pub review_id: i64,
    #[garde(range(min = 1))]
    pub user_id: i64,
    #[garde(custom(whole_rating))]
    pub rating: Option<Number>,
    #[garde(length(min = 1, max = 5000))]
    pub comment: Option<String>,
    #[garde(length(min = 2, max = 16))]
    pub locale: Option<String>,
}

impl CreateFeedbackReview {
    pub fn new(review_id: i64, user_id: i64, rating: impl Into<Number>) -> Self {
        Self {
            review_id,
            user_id,
            rating: Some(rating.into()),
            comment: None,
            locale: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, sqlx::FromRow)]
pub struct FeedbackReview {
    pub id: i64,
    pub review_id: i64,
    pub user_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    pub locale: Option<String>,
    pub created: time::PrimitiveDateTime,
}

pub type FeedbackReviewRepository = FeedbackReviewRepositoryImpl<Pool<ChosenDB>>;

/// Feedback reviews are immutable, they only go away together with their review.
pub struct FeedbackReviewRepositoryImpl<E> {
    executor: E,
    settings: ReviewSettings,
}

impl<'c, E> FeedbackReviewRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB> + Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E, settings: ReviewSettings) -> Self {
        Self { executor, settings }
    }

    /// Stores feedback and touches the owning review's modified time.
    pub async fn create(&self, payload: CreateFeedbackReview) -> Result<FeedbackReview> {
        payload.validate()?;
        let rating = check_rating(payload.rating.as_ref())
            .map_err(|kind| ValidationError::new("rating", kind))?;
        let locale = payload.locale.filter(|_| self.settings.track_locale());

        let mut tx = self.executor.begin().await?;
        let touched = sqlx::query("UPDATE review SET modified = datetime('now') WHERE id = ?")
            .bind(payload.review_id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Err(Error::RecordNotFound("Review".to_string()));
        }

        let result = sqlx::query(
            "INSERT INTO feedback_review (review_id, user_id, rating, comment, locale) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(payload.review_id)
        .bind(payload.user_id)
        .bind(rating)
        .bind(&payload.comment)
        .bind(&locale)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
        let record = get(id, &mut *tx).await?;
        tx.commit().await?;
        debug!("Created feedback {id} for review {}", record.review_id);
        Ok(record)
    }

    pub async fn get(&self, id: i64) -> Result<FeedbackReview> {
        get(id, &self.executor).await
    }

    /// Most recent first.
    pub async fn list_for_review(&self, review_id: i64) -> Result<Vec<FeedbackReview>> {
        let records = sqlx::query_as::<_, FeedbackReview>(
            "SELECT * FROM feedback_review WHERE review_id = ? ORDER BY created DESC, id DESC",
        )
        .bind(review_id)
        .fetch(&self.executor)
        .try_collect::<Vec<_>>()
        .await?;
        Ok(records)
    }

    pub async fn count_for_review(&self, review_id: i64) -> Result<u64> {
        let count: u64 =
            sqlx::query_scalar("SELECT count(*) FROM feedback_review WHERE review_id = ?")
                .bind(review_id)
                .fetch_one(&self.executor)
                .await?;
        Ok(count)
    }
}

async fn get<'c, E>(id: i64, executor: E) -> Result<FeedbackReview>
where
    E: Executor<'c, Database = ChosenDB>,
{
    sqlx::query_as::<_, FeedbackReview>("SELECT * FROM feedback_review WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| Error::RecordNotFound("FeedbackReview".to_string()))
}

#[cfg(test)]
mod tests {
    use prs_types::ValidationKind;

    use super::*;

    #[test]
    fn test_feedback_validation() {
        assert!(CreateFeedbackReview::new(1, 2, 5).validate().is_ok());

        let err: ValidationError = CreateFeedbackReview::new(1, 2, 6)
            .validate()
            .unwrap_err()
            .into();
        assert_eq!(err, ValidationError::new("rating", ValidationKind::Range));

        let mut missing_user = CreateFeedbackReview::new(1, 0, 3);
        missing_user.comment = Some("helpful".into());
        let err: ValidationError = missing_user.validate().unwrap_err().into();
        assert_eq!(err.field, "user_id");
    }
}
