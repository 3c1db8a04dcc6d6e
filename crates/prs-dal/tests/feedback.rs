mod common;

use common::{create_product, init_db, review_for};
use prs_dal::{
    Error,
    feedback_review::{CreateFeedbackReview, FeedbackReviewRepository},
    review::ReviewRepository,
};
use prs_types::{ReviewSettings, ValidationKind};
use serde_json::Number;
use tracing_test::traced_test;

#[tokio::test]
async fn test_feedback_stars_without_feedback() {
    let pool = init_db().await;
    let product = create_product(&pool).await;
    let reviews = ReviewRepository::new(pool.clone(), ReviewSettings::new());

    let review = reviews.create(review_for(product.id, 4)).await.unwrap();
    assert_eq!(reviews.feedback_stars(review.id).await.unwrap(), 0.0);
}

#[tokio::test]
#[traced_test]
async fn test_feedback_stars_average() {
    let pool = init_db().await;
    let product = create_product(&pool).await;
    let settings = ReviewSettings::new();
    let reviews = ReviewRepository::new(pool.clone(), settings.clone());
    let feedback = FeedbackReviewRepository::new(pool.clone(), settings);

    let review = reviews.create(review_for(product.id, 4)).await.unwrap();
    for i in 0..3 {
        feedback
            .create(CreateFeedbackReview::new(review.id, 10 + i, i + 1))
            .await
            .unwrap();
    }

    assert_eq!(feedback.count_for_review(review.id).await.unwrap(), 3);
    assert_eq!(reviews.feedback_stars(review.id).await.unwrap(), 2.0);
    assert!(logs_contain("Created feedback"));

    // always reflects current feedback
    feedback
        .create(CreateFeedbackReview::new(review.id, 20, 4))
        .await
        .unwrap();
    assert_eq!(reviews.feedback_stars(review.id).await.unwrap(), 2.5);
}

#[tokio::test]
async fn test_feedback_listing_most_recent_first() {
    let pool = init_db().await;
    let product = create_product(&pool).await;
    let settings = ReviewSettings::new();
    let reviews = ReviewRepository::new(pool.clone(), settings.clone());
    let feedback = FeedbackReviewRepository::new(pool.clone(), settings);

    let review = reviews.create(review_for(product.id, 4)).await.unwrap();
    let other = reviews.create(review_for(product.id, 2)).await.unwrap();
    let mut first = CreateFeedbackReview::new(review.id, 1, 5);
    first.comment = Some("Very helpful".into());
    let first = feedback.create(first).await.unwrap();
    let second = feedback
        .create(CreateFeedbackReview::new(review.id, 2, 1))
        .await
        .unwrap();
    feedback
        .create(CreateFeedbackReview::new(other.id, 2, 3))
        .await
        .unwrap();

    let listed = feedback.list_for_review(review.id).await.unwrap();
    assert_eq!(listed, vec![second, first.clone()]);
    assert_eq!(feedback.get(first.id).await.unwrap().comment.as_deref(), Some("Very helpful"));
}

#[tokio::test]
async fn test_feedback_removed_with_review() {
    let pool = init_db().await;
    let product = create_product(&pool).await;
    let settings = ReviewSettings::new();
    let reviews = ReviewRepository::new(pool.clone(), settings.clone());
    let feedback = FeedbackReviewRepository::new(pool.clone(), settings);

    let review = reviews.create(review_for(product.id, 4)).await.unwrap();
    let created = feedback
        .create(CreateFeedbackReview::new(review.id, 1, 5))
        .await
        .unwrap();

    reviews.destroy(review.id).await.unwrap();
    assert_eq!(feedback.count_for_review(review.id).await.unwrap(), 0);
    assert!(matches!(
        feedback.get(created.id).await,
        Err(Error::RecordNotFound(_))
    ));
    assert!(matches!(
        reviews.feedback_stars(review.id).await,
        Err(Error::RecordNotFound(_))
    ));
}

#[tokio::test]
async fn test_invalid_feedback() {
    let pool = init_db().await;
    let product = create_product(&pool).await;
    let settings = ReviewSettings::new();
    let reviews = ReviewRepository::new(pool.clone(), settings.clone());
    let feedback = FeedbackReviewRepository::new(pool.clone(), settings);
    let review = reviews.create(review_for(product.id, 4)).await.unwrap();

    let mut fractional = CreateFeedbackReview::new(review.id, 1, 3);
    fractional.rating = Number::from_f64(3.0);
    match feedback.create(fractional).await {
        Err(Error::Validation(e)) => {
            assert_eq!(e.field, "rating");
            assert_eq!(e.kind, ValidationKind::Integer);
        }
        other => panic!("Unexpected result {other:?}"),
    }

    let res = feedback
        .create(CreateFeedbackReview::new(review.id + 100, 1, 3))
        .await;
    assert!(matches!(res, Err(Error::RecordNotFound(_))));
    assert_eq!(feedback.count_for_review(review.id).await.unwrap(), 0);
}
