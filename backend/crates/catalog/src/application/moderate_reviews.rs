//! Review Moderation Use Case
//!
//! Anyone reads a title's reviews; authenticated users write one review per
//! title; the author, moderators and admins change or remove it.

use std::sync::Arc;

use auth::{AccessPolicy, Operation, Requester};
use kernel::error::fields::FieldErrors;
use kernel::id::{ReviewId, TitleId};
use platform::pagination::{Page, PageRequest};

use crate::application::input::{optional_field, require_field};
use crate::domain::entities::{NewReview, Review, Title};
use crate::domain::repository::{ReviewRepository, TitleRepository};
use crate::domain::value_objects::{Score, Text};
use crate::error::{CatalogError, CatalogResult};

const POLICY: AccessPolicy = AccessPolicy::ReadOnlyOrAuthenticated;

/// Review write fields; `None` leaves a field untouched on update
#[derive(Debug, Clone, Default)]
pub struct ReviewInput {
    pub text: Option<String>,
    pub score: Option<i64>,
}

/// Review moderation use case
pub struct ReviewsUseCase<R>
where
    R: TitleRepository + ReviewRepository,
{
    repo: Arc<R>,
}

impl<R> ReviewsUseCase<R>
where
    R: TitleRepository + ReviewRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// GET /titles/{title_id}/reviews
    pub async fn list(&self, title_id: TitleId, page: PageRequest) -> CatalogResult<Page<Review>> {
        self.title(title_id).await?;
        let (reviews, count) = self.repo.list_reviews(title_id, page).await?;
        Ok(Page::new(reviews, count, page))
    }

    /// GET /titles/{title_id}/reviews/{review_id}
    pub async fn get(&self, title_id: TitleId, review_id: ReviewId) -> CatalogResult<Review> {
        self.title(title_id).await?;
        self.review(title_id, review_id).await
    }

    /// POST /titles/{title_id}/reviews
    pub async fn create(
        &self,
        requester: &Requester,
        title_id: TitleId,
        input: ReviewInput,
    ) -> CatalogResult<Review> {
        POLICY.check(requester, Operation::Write)?;
        let principal = requester.require_principal()?;
        let title = self.title(title_id).await?;

        let mut errors = FieldErrors::new();
        let text = require_field(&mut errors, "text", input.text, Text::new);
        let score = require_field(&mut errors, "score", input.score, Score::new);
        errors.into_result()?;

        if self.repo.review_exists(title.id, principal.id).await? {
            return Err(CatalogError::DuplicateReview);
        }

        let (Some(text), Some(score)) = (text, score) else {
            return Err(CatalogError::Internal("required review fields unresolved".to_string()));
        };

        let review = self
            .repo
            .create_review(&NewReview {
                title_id: title.id,
                author_id: principal.id,
                author: principal.user_name.clone(),
                text: text.into_inner(),
                score,
            })
            .await?;

        tracing::info!(
            title_id = %title.id,
            review_id = %review.id,
            author_id = %principal.id,
            "Review created"
        );
        Ok(review)
    }

    /// PATCH /titles/{title_id}/reviews/{review_id}
    pub async fn update(
        &self,
        requester: &Requester,
        title_id: TitleId,
        review_id: ReviewId,
        input: ReviewInput,
    ) -> CatalogResult<Review> {
        POLICY.check(requester, Operation::Write)?;
        self.title(title_id).await?;
        let mut review = self.review(title_id, review_id).await?;
        POLICY.check_object(requester, Operation::Write, Some(review.author_id))?;

        let mut errors = FieldErrors::new();
        let text = optional_field(&mut errors, "text", input.text, Text::new);
        let score = optional_field(&mut errors, "score", input.score, Score::new);
        errors.into_result()?;

        if let Some(text) = text {
            review.text = text.into_inner();
        }
        if let Some(score) = score {
            review.score = score;
        }

        self.repo.update_review(&review).await?;

        tracing::info!(review_id = %review.id, "Review updated");
        Ok(review)
    }

    /// DELETE /titles/{title_id}/reviews/{review_id}
    pub async fn delete(
        &self,
        requester: &Requester,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> CatalogResult<()> {
        POLICY.check(requester, Operation::Write)?;
        self.title(title_id).await?;
        let review = self.review(title_id, review_id).await?;
        POLICY.check_object(requester, Operation::Write, Some(review.author_id))?;

        if !self.repo.delete_review(&review).await? {
            return Err(CatalogError::NotFound("Review"));
        }

        tracing::info!(review_id = %review.id, "Review deleted");
        Ok(())
    }

    async fn title(&self, title_id: TitleId) -> CatalogResult<Title> {
        self.repo
            .find_title(title_id)
            .await?
            .ok_or(CatalogError::NotFound("Title"))
    }

    async fn review(&self, title_id: TitleId, review_id: ReviewId) -> CatalogResult<Review> {
        self.repo
            .find_review(title_id, review_id)
            .await?
            .ok_or(CatalogError::NotFound("Review"))
    }
}
