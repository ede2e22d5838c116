//! Comment Moderation Use Case
//!
//! Comments live under `/titles/{title_id}/reviews/{review_id}`; the review
//! must belong to the title. Ownership rules match reviews.

use std::sync::Arc;

use auth::{AccessPolicy, Operation, Requester};
use kernel::error::fields::FieldErrors;
use kernel::id::{CommentId, ReviewId, TitleId};
use platform::pagination::{Page, PageRequest};

use crate::application::input::require_field;
use crate::domain::entities::{Comment, NewComment, Review};
use crate::domain::repository::{CommentRepository, ReviewRepository, TitleRepository};
use crate::domain::value_objects::Text;
use crate::error::{CatalogError, CatalogResult};

const POLICY: AccessPolicy = AccessPolicy::ReadOnlyOrAuthenticated;

/// Comment write fields
#[derive(Debug, Clone, Default)]
pub struct CommentInput {
    pub text: Option<String>,
}

/// Comment moderation use case
pub struct CommentsUseCase<R>
where
    R: TitleRepository + ReviewRepository + CommentRepository,
{
    repo: Arc<R>,
}

impl<R> CommentsUseCase<R>
where
    R: TitleRepository + ReviewRepository + CommentRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// GET …/comments
    pub async fn list(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
        page: PageRequest,
    ) -> CatalogResult<Page<Comment>> {
        let review = self.review(title_id, review_id).await?;
        let (comments, count) = self.repo.list_comments(review.id, page).await?;
        Ok(Page::new(comments, count, page))
    }

    /// GET …/comments/{comment_id}
    pub async fn get(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> CatalogResult<Comment> {
        let review = self.review(title_id, review_id).await?;
        self.comment(review.id, comment_id).await
    }

    /// POST …/comments
    pub async fn create(
        &self,
        requester: &Requester,
        title_id: TitleId,
        review_id: ReviewId,
        input: CommentInput,
    ) -> CatalogResult<Comment> {
        POLICY.check(requester, Operation::Write)?;
        let principal = requester.require_principal()?;
        let review = self.review(title_id, review_id).await?;

        let mut errors = FieldErrors::new();
        let text = require_field(&mut errors, "text", input.text, Text::new);
        errors.into_result()?;
        let Some(text) = text else {
            return Err(CatalogError::Internal("required comment fields unresolved".to_string()));
        };

        let comment = self
            .repo
            .create_comment(&NewComment {
                review_id: review.id,
                author_id: principal.id,
                author: principal.user_name.clone(),
                text: text.into_inner(),
            })
            .await?;

        tracing::info!(
            review_id = %review.id,
            comment_id = %comment.id,
            author_id = %principal.id,
            "Comment created"
        );
        Ok(comment)
    }

    /// PATCH …/comments/{comment_id}
    pub async fn update(
        &self,
        requester: &Requester,
        title_id: TitleId,
        review_id: ReviewId,
        comment_id: CommentId,
        input: CommentInput,
    ) -> CatalogResult<Comment> {
        POLICY.check(requester, Operation::Write)?;
        let review = self.review(title_id, review_id).await?;
        let mut comment = self.comment(review.id, comment_id).await?;
        POLICY.check_object(requester, Operation::Write, Some(comment.author_id))?;

        if let Some(raw) = input.text {
            let text = Text::new(raw).map_err(|e| CatalogError::field("text", e.to_string()))?;
            comment.text = text.into_inner();
        }

        self.repo.update_comment(&comment).await?;

        tracing::info!(comment_id = %comment.id, "Comment updated");
        Ok(comment)
    }

    /// DELETE …/comments/{comment_id}
    pub async fn delete(
        &self,
        requester: &Requester,
        title_id: TitleId,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> CatalogResult<()> {
        POLICY.check(requester, Operation::Write)?;
        let review = self.review(title_id, review_id).await?;
        let comment = self.comment(review.id, comment_id).await?;
        POLICY.check_object(requester, Operation::Write, Some(comment.author_id))?;

        if !self.repo.delete_comment(comment.id).await? {
            return Err(CatalogError::NotFound("Comment"));
        }

        tracing::info!(comment_id = %comment.id, "Comment deleted");
        Ok(())
    }

    /// The review, provided the title exists and owns it
    async fn review(&self, title_id: TitleId, review_id: ReviewId) -> CatalogResult<Review> {
        if self.repo.find_title(title_id).await?.is_none() {
            return Err(CatalogError::NotFound("Title"));
        }
        self.repo
            .find_review(title_id, review_id)
            .await?
            .ok_or(CatalogError::NotFound("Review"))
    }

    async fn comment(&self, review_id: ReviewId, comment_id: CommentId) -> CatalogResult<Comment> {
        self.repo
            .find_comment(review_id, comment_id)
            .await?
            .ok_or(CatalogError::NotFound("Comment"))
    }
}
