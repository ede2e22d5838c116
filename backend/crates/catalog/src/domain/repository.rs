//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//! Method names carry their entity so one store can implement every trait.

use kernel::id::{CommentId, ReviewId, TitleId, UserId};
use platform::pagination::PageRequest;

use crate::domain::entities::{
    Comment, NewComment, NewReview, NewTerm, NewTitle, Review, Term, TermKind, Title, TitleChanges,
    TitleFilter,
};
use crate::domain::value_objects::Slug;
use crate::error::CatalogResult;

/// Category and genre repository
#[trait_variant::make(TermRepository: Send)]
pub trait LocalTermRepository {
    /// Insert a term; a slug collision surfaces as a `slug` field error
    async fn create_term<K: TermKind>(&self, term: &NewTerm) -> CatalogResult<Term<K>>;

    /// Terms whose slug is one of `slugs`, in any order
    async fn find_terms<K: TermKind>(&self, slugs: &[Slug]) -> CatalogResult<Vec<Term<K>>>;

    /// Page of terms ordered by slug, plus the total match count.
    /// `search` is a case-insensitive substring of name or slug.
    async fn list_terms<K: TermKind>(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Term<K>>, u64)>;

    /// Delete by slug, returning the removed term
    async fn delete_term<K: TermKind>(&self, slug: &Slug) -> CatalogResult<Option<Term<K>>>;
}

/// Title repository
#[trait_variant::make(TitleRepository: Send)]
pub trait LocalTitleRepository {
    /// Insert a title and its genre links in one transaction
    async fn create_title(&self, title: &NewTitle) -> CatalogResult<Title>;

    async fn find_title(&self, title_id: TitleId) -> CatalogResult<Option<Title>>;

    /// Page of titles ordered by id, plus the total match count
    async fn list_titles(
        &self,
        filter: &TitleFilter,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Title>, u64)>;

    /// Apply `changes` to the stored title in one transaction, returning the
    /// updated title or `None` when it does not exist. Terms removed since
    /// they were resolved are `category`/`genre` field errors. `rating` is
    /// left alone.
    async fn update_title(
        &self,
        title_id: TitleId,
        changes: &TitleChanges,
    ) -> CatalogResult<Option<Title>>;

    /// Delete title (reviews and comments cascade)
    async fn delete_title(&self, title_id: TitleId) -> CatalogResult<bool>;
}

/// Review repository
///
/// Every write recomputes the owning title's rating in the same transaction.
#[trait_variant::make(ReviewRepository: Send)]
pub trait LocalReviewRepository {
    /// Insert a review; an `(author, title)` collision is `DuplicateReview`
    async fn create_review(&self, review: &NewReview) -> CatalogResult<Review>;

    /// Review `review_id` if it belongs to `title_id`
    async fn find_review(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> CatalogResult<Option<Review>>;

    /// Whether `author_id` already reviewed `title_id`
    async fn review_exists(&self, title_id: TitleId, author_id: UserId) -> CatalogResult<bool>;

    /// Page of a title's reviews, oldest first
    async fn list_reviews(
        &self,
        title_id: TitleId,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Review>, u64)>;

    /// Persist text and score
    async fn update_review(&self, review: &Review) -> CatalogResult<()>;

    /// Delete review (comments cascade)
    async fn delete_review(&self, review: &Review) -> CatalogResult<bool>;
}

/// Comment repository
#[trait_variant::make(CommentRepository: Send)]
pub trait LocalCommentRepository {
    async fn create_comment(&self, comment: &NewComment) -> CatalogResult<Comment>;

    /// Comment `comment_id` if it belongs to `review_id`
    async fn find_comment(
        &self,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> CatalogResult<Option<Comment>>;

    /// Page of a review's comments, oldest first
    async fn list_comments(
        &self,
        review_id: ReviewId,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Comment>, u64)>;

    /// Persist text
    async fn update_comment(&self, comment: &Comment) -> CatalogResult<()>;

    async fn delete_comment(&self, comment_id: CommentId) -> CatalogResult<bool>;
}

/// Everything the catalog endpoints need from one store
pub trait CatalogRepository:
    TermRepository + TitleRepository + ReviewRepository + CommentRepository
{
}

impl<T> CatalogRepository for T where
    T: TermRepository + TitleRepository + ReviewRepository + CommentRepository
{
}
