use futures::{StreamExt as _, TryStreamExt as _};
use garde::Validate;
use prs_types::{
    ReviewSettings, ValidationError,
    validate::{check_rating, presence, required_text, whole_rating},
};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use sqlx::{Acquire, Executor, Pool};
use tracing::{debug, info};

use crate::{ChosenDB, Error, ListingParams, MAX_LIMIT, error::Result, rating};

const VALID_ORDER_FIELDS: &[&str] = &["id", "created", "modified", "rating", "name"];
const MOST_RECENT_FIRST: &str = "created DESC, id DESC";

fn default_show_identifier() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateReview {
    #[garde(range(min = 1))]
    pub product_id: i64,
    #[garde(range(min = 1))]
    pub user_id: Option<i64>,
    #[garde(custom(presence), length(max = 255))]
    pub name: String,
    #[garde(length(max = 255))]
    pub title: Option<String>,
    #[garde(length(max = 255))]
    pub location: Option<String>,
    #[garde(custom(whole_rating))]
    pub rating: Option<Number>,
    #[garde(custom(required_text), length(max = 10000))]
    pub review: Option<String>,
    #[serde(default)]
    #[garde(skip)]
    pub approved: bool,
    #[garde(length(min = 2, max = 16))]
    pub locale: Option<String>,
    #[garde(length(max = 45))]
    pub ip_address: Option<String>,
    #[serde(default = "default_show_identifier")]
    #[garde(skip)]
    pub show_identifier: bool,
}

impl CreateReview {
    pub fn new(
        product_id: i64,
        name: impl Into<String>,
        rating: impl Into<Number>,
        review: impl Into<String>,
    ) -> Self {
        Self {
            product_id,
            user_id: None,
            name: name.into(),
            title: None,
            location: None,
            rating: Some(rating.into()),
            review: Some(review.into()),
            approved: false,
            locale: None,
            ip_address: None,
            show_identifier: true,
        }
    }

    pub fn by_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_approval(mut self, approved: bool) -> Self {
        self.approved = approved;
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct UpdateReview {
    #[garde(custom(presence), length(max = 255))]
    pub name: String,
    #[garde(length(max = 255))]
    pub title: Option<String>,
    #[garde(length(max = 255))]
    pub location: Option<String>,
    #[garde(custom(whole_rating))]
    pub rating: Option<Number>,
    #[garde(custom(required_text), length(max = 10000))]
    pub review: Option<String>,
    #[garde(skip)]
    pub show_identifier: bool,
    #[garde(range(min = 0))]
    pub version: Option<i64>,
}

impl From<&Review> for UpdateReview {
    fn from(review: &Review) -> Self {
        Self {
            name: review.name.clone(),
            title: review.title.clone(),
            location: review.location.clone(),
            rating: Some(review.rating.into()),
            review: Some(review.review.clone()),
            show_identifier: review.show_identifier,
            version: Some(review.version),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, sqlx::FromRow)]
pub struct Review {
    pub id: i64,
    pub product_id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub title: Option<String>,
    pub location: Option<String>,
    pub rating: i64,
    pub review: String,
    pub approved: bool,
    pub locale: Option<String>,
    pub ip_address: Option<String>,
    pub show_identifier: bool,
    pub version: i64,
    pub created: time::PrimitiveDateTime,
    pub modified: time::PrimitiveDateTime,
}

/// Approval based selection of reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewScope {
    All,
    Approved,
    NotApproved,
    /// Approved reviews, plus unapproved ones when `include_unapproved_reviews` is set.
    ApprovalFilter,
}

impl ReviewScope {
    /// Returns (approved reviews included, unapproved reviews included).
    ///
    /// Settings are consulted on every call.
    pub fn visibility(&self, settings: &ReviewSettings) -> (bool, bool) {
        match self {
            ReviewScope::All => (true, true),
            ReviewScope::Approved => (true, false),
            ReviewScope::NotApproved => (false, true),
            ReviewScope::ApprovalFilter => (true, settings.include_unapproved_reviews()),
        }
    }
}

fn rating_value(rating: Option<&Number>) -> Result<i64, ValidationError> {
    check_rating(rating).map_err(|kind| ValidationError::new("rating", kind))
}

pub type ReviewRepository = ReviewRepositoryImpl<Pool<ChosenDB>>;

pub struct ReviewRepositoryImpl<E> {
    executor: E,
    settings: ReviewSettings,
}

impl<'c, E> ReviewRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB> + Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E, settings: ReviewSettings) -> Self {
        Self { executor, settings }
    }

    pub fn settings(&self) -> &ReviewSettings {
        &self.settings
    }

    /// Product rating is recalculated if the new review is approved.
    pub async fn create(&self, payload: CreateReview) -> Result<Review> {
        payload.validate()?;
        if self.settings.require_login() && payload.user_id.is_none() {
            return Err(ValidationError::presence("user_id").into());
        }
        let rating = rating_value(payload.rating.as_ref())?;
        let body = payload
            .review
            .ok_or_else(|| ValidationError::presence("review"))?;
        let locale = payload.locale.filter(|_| self.settings.track_locale());

        let mut tx = self.executor.begin().await?;
        crate::product::get(payload.product_id, &mut *tx).await?;
        let result = sqlx::query(
            "INSERT INTO review (product_id, user_id, name, title, location, rating, review, approved, locale, ip_address, show_identifier, version)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)",
        )
        .bind(payload.product_id)
        .bind(payload.user_id)
        .bind(&payload.name)
        .bind(&payload.title)
        .bind(&payload.location)
        .bind(rating)
        .bind(&body)
        .bind(payload.approved)
        .bind(&locale)
        .bind(&payload.ip_address)
        .bind(payload.show_identifier)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
        if payload.approved {
            rating::recalculate_product_rating(&mut *tx, payload.product_id).await?;
        }
        let record = get(id, &mut *tx).await?;
        tx.commit().await?;
        debug!("Created review {id} for product {}", record.product_id);
        Ok(record)
    }

    pub async fn update(&self, id: i64, payload: UpdateReview) -> Result<Review> {
        payload.validate()?;
        let version = payload.version.ok_or_else(|| {
            debug!("No version provided");
            Error::MissingVersion
        })?;
        let rating = rating_value(payload.rating.as_ref())?;
        let body = payload
            .review
            .ok_or_else(|| ValidationError::presence("review"))?;

        let mut tx = self.executor.begin().await?;
        let result = sqlx::query(
            "UPDATE review SET name = ?, title = ?, location = ?, rating = ?, review = ?, show_identifier = ?,
            version = ?, modified = datetime('now') WHERE id = ? AND version = ?",
        )
        .bind(&payload.name)
        .bind(&payload.title)
        .bind(&payload.location)
        .bind(rating)
        .bind(&body)
        .bind(payload.show_identifier)
        .bind(version + 1)
        .bind(id)
        .bind(version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::FailedUpdate { id, version });
        }
        let record = get(id, &mut *tx).await?;
        rating::recalculate_product_rating(&mut *tx, record.product_id).await?;
        tx.commit().await?;
        Ok(record)
    }

    pub async fn approve(&self, id: i64) -> Result<Review> {
        self.set_approval(id, true).await
    }

    pub async fn unapprove(&self, id: i64) -> Result<Review> {
        self.set_approval(id, false).await
    }

    async fn set_approval(&self, id: i64, approved: bool) -> Result<Review> {
        let mut tx = self.executor.begin().await?;
        let res = sqlx::query(
            "UPDATE review SET approved = ?, version = version + 1, modified = datetime('now') WHERE id = ?",
        )
        .bind(approved)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if res.rows_affected() == 0 {
            return Err(Error::RecordNotFound("Review".to_string()));
        }
        let record = get(id, &mut *tx).await?;
        rating::recalculate_product_rating(&mut *tx, record.product_id).await?;
        tx.commit().await?;
        info!(
            "Review {id} {}",
            if approved { "approved" } else { "unapproved" }
        );
        Ok(record)
    }

    /// Deletes review with its feedback and recalculates product rating.
    pub async fn destroy(&self, id: i64) -> Result<()> {
        let mut tx = self.executor.begin().await?;
        let product_id: i64 = sqlx::query_scalar("SELECT product_id FROM review WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::RecordNotFound("Review".to_string()))?;

        sqlx::query("DELETE FROM review WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        rating::recalculate_product_rating(&mut *tx, product_id).await?;
        tx.commit().await?;
        info!("Review {id} of product {product_id} destroyed");
        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<Review> {
        get(id, &self.executor).await
    }

    pub async fn list(&self, scope: ReviewScope, params: ListingParams) -> Result<Vec<Review>> {
        self.select(scope, None, params).await
    }

    pub async fn list_for_product(
        &self,
        product_id: i64,
        scope: ReviewScope,
        params: ListingParams,
    ) -> Result<Vec<Review>> {
        self.select(scope, Some(product_id), params).await
    }

    /// Page (1 based) of product reviews visible under the approval filter.
    pub async fn page_for_product(&self, product_id: i64, page: i64) -> Result<Vec<Review>> {
        let params = ListingParams::page(page, self.settings.paginate_size());
        self.select(ReviewScope::ApprovalFilter, Some(product_id), params)
            .await
    }

    pub async fn approved(&self, params: ListingParams) -> Result<Vec<Review>> {
        self.list(ReviewScope::Approved, params).await
    }

    pub async fn not_approved(&self, params: ListingParams) -> Result<Vec<Review>> {
        self.list(ReviewScope::NotApproved, params).await
    }

    pub async fn approval_filter(&self, params: ListingParams) -> Result<Vec<Review>> {
        self.list(ReviewScope::ApprovalFilter, params).await
    }

    /// Most recent reviews of the product, as many as `preview_size` setting allows.
    pub async fn preview(&self, product_id: i64) -> Result<Vec<Review>> {
        let params = ListingParams::new(0, self.settings.preview_size());
        self.select(ReviewScope::ApprovalFilter, Some(product_id), params)
            .await
    }

    pub async fn count(&self, scope: ReviewScope, product_id: Option<i64>) -> Result<u64> {
        let (with_approved, with_unapproved) = scope.visibility(&self.settings);
        let count: u64 = sqlx::query_scalar(
            "SELECT count(*) FROM review
            WHERE ((approved = 1 AND ?) OR (approved = 0 AND ?)) AND (? IS NULL OR product_id = ?)",
        )
        .bind(with_approved)
        .bind(with_unapproved)
        .bind(product_id)
        .bind(product_id)
        .fetch_one(&self.executor)
        .await?;
        Ok(count)
    }

    /// Mean of feedback ratings of the review, 0 if it has none.
    pub async fn feedback_stars(&self, review_id: i64) -> Result<f64> {
        let mut conn = self.executor.acquire().await?;
        get(review_id, &mut *conn).await?;
        let aggregate = rating::feedback_aggregate(&mut *conn, review_id).await?;
        Ok(aggregate.average())
    }

    async fn select(
        &self,
        scope: ReviewScope,
        product_id: Option<i64>,
        params: ListingParams,
    ) -> Result<Vec<Review>> {
        let order = params.ordering(VALID_ORDER_FIELDS, MOST_RECENT_FIRST)?;
        let (with_approved, with_unapproved) = scope.visibility(&self.settings);
        debug!("Listing reviews {scope:?} for product {product_id:?}");
        let records = sqlx::query_as::<_, Review>(&format!(
            "SELECT * FROM review
            WHERE ((approved = 1 AND ?) OR (approved = 0 AND ?)) AND (? IS NULL OR product_id = ?)
            {order} LIMIT ? OFFSET ?"
        ))
        .bind(with_approved)
        .bind(with_unapproved)
        .bind(product_id)
        .bind(product_id)
        .bind(params.limit)
        .bind(params.offset)
        .fetch(&self.executor)
        .take(MAX_LIMIT)
        .try_collect::<Vec<_>>()
        .await?;
        Ok(records)
    }
}

async fn get<'c, E>(id: i64, executor: E) -> Result<Review>
where
    E: Executor<'c, Database = ChosenDB>,
{
    sqlx::query_as::<_, Review>("SELECT * FROM review WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| Error::RecordNotFound("Review".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_filter_reads_current_setting() {
        let settings = ReviewSettings::new();
        assert_eq!(ReviewScope::ApprovalFilter.visibility(&settings), (true, false));
        settings.set_include_unapproved_reviews(true);
        assert_eq!(ReviewScope::ApprovalFilter.visibility(&settings), (true, true));
        assert_eq!(ReviewScope::Approved.visibility(&settings), (true, false));
        assert_eq!(ReviewScope::NotApproved.visibility(&settings), (false, true));
    }

    #[test]
    fn test_create_review_validation() {
        let valid = CreateReview::new(1, "Jane", 4, "Works as advertised").by_user(1);
        assert!(valid.validate().is_ok());

        let mut blank_name = valid.clone();
        blank_name.name = "".into();
        let err: ValidationError = blank_name.validate().unwrap_err().into();
        assert_eq!(err, ValidationError::presence("name"));

        let mut no_rating = valid.clone();
        no_rating.rating = None;
        let err: ValidationError = no_rating.validate().unwrap_err().into();
        assert_eq!(err, ValidationError::presence("rating"));

        let mut fractional = valid.clone();
        fractional.rating = Number::from_f64(2.0);
        let err: ValidationError = fractional.validate().unwrap_err().into();
        assert_eq!(err.kind, prs_types::ValidationKind::Integer);

        let mut no_body = valid;
        no_body.review = None;
        let err: ValidationError = no_body.validate().unwrap_err().into();
        assert_eq!(err, ValidationError::presence("review"));
    }

    #[test]
    fn test_deserialized_float_rating_is_rejected() {
        let payload: CreateReview = serde_json::from_str(
            r#"{"product_id": 1, "user_id": 2, "name": "Jane", "rating": 2.0, "review": "Nice"}"#,
        )
        .unwrap();
        assert!(!payload.approved);
        assert!(payload.show_identifier);
        let err: ValidationError = payload.validate().unwrap_err().into();
        assert_eq!(err.field, "rating");
        assert_eq!(err.kind, prs_types::ValidationKind::Integer);
    }
}
