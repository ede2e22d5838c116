//! HTTP Handlers

use auth::Requester;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use kernel::extract::ValidJson;
use kernel::id::{CommentId, ReviewId, TitleId};
use platform::pagination::{Page, PageParams};
use std::sync::Arc;

use crate::application::{
    CatalogConfig, CommentsUseCase, ManageTermsUseCase, ManageTitlesUseCase, ReviewsUseCase,
};
use crate::domain::entities::TermKind;
use crate::domain::repository::CatalogRepository;
use crate::error::CatalogResult;
use crate::presentation::dto::{
    CommentRequest, CommentView, ReviewRequest, ReviewView, SearchQuery, TermRequest, TermView,
    TitleListQuery, TitleReadView, TitleWriteRequest,
};

/// Shared state for catalog handlers
#[derive(Clone)]
pub struct CatalogAppState<R>
where
    R: CatalogRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<CatalogConfig>,
}

// ============================================================================
// Categories / Genres
// ============================================================================

/// GET /categories, GET /genres
pub async fn list_terms<R, K>(
    State(state): State<CatalogAppState<R>>,
    Query(query): Query<SearchQuery>,
) -> CatalogResult<Json<Page<TermView>>>
where
    R: CatalogRepository + Clone + Send + Sync + 'static,
    K: TermKind,
{
    let page = state.config.page(query.page());
    let use_case = ManageTermsUseCase::new(state.repo.clone());

    let terms = use_case.list::<K>(query.search.as_deref(), page).await?;

    Ok(Json(terms.map(TermView::from)))
}

/// POST /categories, POST /genres
pub async fn create_term<R, K>(
    State(state): State<CatalogAppState<R>>,
    requester: Requester,
    ValidJson(req): ValidJson<TermRequest>,
) -> CatalogResult<(StatusCode, Json<TermView>)>
where
    R: CatalogRepository + Clone + Send + Sync + 'static,
    K: TermKind,
{
    let use_case = ManageTermsUseCase::new(state.repo.clone());

    let term = use_case.create::<K>(&requester, req.into()).await?;

    Ok((StatusCode::CREATED, Json(term.into())))
}

/// DELETE /categories/{slug}, DELETE /genres/{slug}
pub async fn delete_term<R, K>(
    State(state): State<CatalogAppState<R>>,
    requester: Requester,
    Path(slug): Path<String>,
) -> CatalogResult<StatusCode>
where
    R: CatalogRepository + Clone + Send + Sync + 'static,
    K: TermKind,
{
    let use_case = ManageTermsUseCase::new(state.repo.clone());

    use_case.delete::<K>(&requester, &slug).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Titles
// ============================================================================

/// GET /titles
pub async fn list_titles<R>(
    State(state): State<CatalogAppState<R>>,
    Query(query): Query<TitleListQuery>,
) -> CatalogResult<Json<Page<TitleReadView>>>
where
    R: CatalogRepository + Clone + Send + Sync + 'static,
{
    let page = state.config.page(query.page());
    let use_case = ManageTitlesUseCase::new(state.repo.clone());

    let titles = use_case.list(query.filter(), page).await?;

    Ok(Json(titles.map(TitleReadView::from)))
}

/// POST /titles
pub async fn create_title<R>(
    State(state): State<CatalogAppState<R>>,
    requester: Requester,
    ValidJson(req): ValidJson<TitleWriteRequest>,
) -> CatalogResult<(StatusCode, Json<TitleReadView>)>
where
    R: CatalogRepository + Clone + Send + Sync + 'static,
{
    let use_case = ManageTitlesUseCase::new(state.repo.clone());

    let title = use_case.create(&requester, req.into()).await?;

    Ok((StatusCode::CREATED, Json(title.into())))
}

/// GET /titles/{title_id}
pub async fn get_title<R>(
    State(state): State<CatalogAppState<R>>,
    Path(title_id): Path<TitleId>,
) -> CatalogResult<Json<TitleReadView>>
where
    R: CatalogRepository + Clone + Send + Sync + 'static,
{
    let use_case = ManageTitlesUseCase::new(state.repo.clone());

    let title = use_case.get(title_id).await?;

    Ok(Json(title.into()))
}

/// PATCH /titles/{title_id}
pub async fn update_title<R>(
    State(state): State<CatalogAppState<R>>,
    requester: Requester,
    Path(title_id): Path<TitleId>,
    ValidJson(req): ValidJson<TitleWriteRequest>,
) -> CatalogResult<Json<TitleReadView>>
where
    R: CatalogRepository + Clone + Send + Sync + 'static,
{
    let use_case = ManageTitlesUseCase::new(state.repo.clone());

    let title = use_case.update(&requester, title_id, req.into()).await?;

    Ok(Json(title.into()))
}

/// DELETE /titles/{title_id}
pub async fn delete_title<R>(
    State(state): State<CatalogAppState<R>>,
    requester: Requester,
    Path(title_id): Path<TitleId>,
) -> CatalogResult<StatusCode>
where
    R: CatalogRepository + Clone + Send + Sync + 'static,
{
    let use_case = ManageTitlesUseCase::new(state.repo.clone());

    use_case.delete(&requester, title_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Reviews
// ============================================================================

/// GET /titles/{title_id}/reviews
pub async fn list_reviews<R>(
    State(state): State<CatalogAppState<R>>,
    Path(title_id): Path<TitleId>,
    Query(params): Query<PageParams>,
) -> CatalogResult<Json<Page<ReviewView>>>
where
    R: CatalogRepository + Clone + Send + Sync + 'static,
{
    let use_case = ReviewsUseCase::new(state.repo.clone());

    let reviews = use_case.list(title_id, state.config.page(params)).await?;

    Ok(Json(reviews.map(ReviewView::from)))
}

/// POST /titles/{title_id}/reviews
pub async fn create_review<R>(
    State(state): State<CatalogAppState<R>>,
    requester: Requester,
    Path(title_id): Path<TitleId>,
    ValidJson(req): ValidJson<ReviewRequest>,
) -> CatalogResult<(StatusCode, Json<ReviewView>)>
where
    R: CatalogRepository + Clone + Send + Sync + 'static,
{
    let use_case = ReviewsUseCase::new(state.repo.clone());

    let review = use_case.create(&requester, title_id, req.into()).await?;

    Ok((StatusCode::CREATED, Json(review.into())))
}

/// GET /titles/{title_id}/reviews/{review_id}
pub async fn get_review<R>(
    State(state): State<CatalogAppState<R>>,
    Path((title_id, review_id)): Path<(TitleId, ReviewId)>,
) -> CatalogResult<Json<ReviewView>>
where
    R: CatalogRepository + Clone + Send + Sync + 'static,
{
    let use_case = ReviewsUseCase::new(state.repo.clone());

    let review = use_case.get(title_id, review_id).await?;

    Ok(Json(review.into()))
}

/// PATCH /titles/{title_id}/reviews/{review_id}
pub async fn update_review<R>(
    State(state): State<CatalogAppState<R>>,
    requester: Requester,
    Path((title_id, review_id)): Path<(TitleId, ReviewId)>,
    ValidJson(req): ValidJson<ReviewRequest>,
) -> CatalogResult<Json<ReviewView>>
where
    R: CatalogRepository + Clone + Send + Sync + 'static,
{
    let use_case = ReviewsUseCase::new(state.repo.clone());

    let review = use_case
        .update(&requester, title_id, review_id, req.into())
        .await?;

    Ok(Json(review.into()))
}

/// DELETE /titles/{title_id}/reviews/{review_id}
pub async fn delete_review<R>(
    State(state): State<CatalogAppState<R>>,
    requester: Requester,
    Path((title_id, review_id)): Path<(TitleId, ReviewId)>,
) -> CatalogResult<StatusCode>
where
    R: CatalogRepository + Clone + Send + Sync + 'static,
{
    let use_case = ReviewsUseCase::new(state.repo.clone());

    use_case.delete(&requester, title_id, review_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Comments
// ============================================================================

/// GET /titles/{title_id}/reviews/{review_id}/comments
pub async fn list_comments<R>(
    State(state): State<CatalogAppState<R>>,
    Path((title_id, review_id)): Path<(TitleId, ReviewId)>,
    Query(params): Query<PageParams>,
) -> CatalogResult<Json<Page<CommentView>>>
where
    R: CatalogRepository + Clone + Send + Sync + 'static,
{
    let use_case = CommentsUseCase::new(state.repo.clone());

    let comments = use_case
        .list(title_id, review_id, state.config.page(params))
        .await?;

    Ok(Json(comments.map(CommentView::from)))
}

/// POST /titles/{title_id}/reviews/{review_id}/comments
pub async fn create_comment<R>(
    State(state): State<CatalogAppState<R>>,
    requester: Requester,
    Path((title_id, review_id)): Path<(TitleId, ReviewId)>,
    ValidJson(req): ValidJson<CommentRequest>,
) -> CatalogResult<(StatusCode, Json<CommentView>)>
where
    R: CatalogRepository + Clone + Send + Sync + 'static,
{
    let use_case = CommentsUseCase::new(state.repo.clone());

    let comment = use_case
        .create(&requester, title_id, review_id, req.into())
        .await?;

    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// GET /titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn get_comment<R>(
    State(state): State<CatalogAppState<R>>,
    Path((title_id, review_id, comment_id)): Path<(TitleId, ReviewId, CommentId)>,
) -> CatalogResult<Json<CommentView>>
where
    R: CatalogRepository + Clone + Send + Sync + 'static,
{
    let use_case = CommentsUseCase::new(state.repo.clone());

    let comment = use_case.get(title_id, review_id, comment_id).await?;

    Ok(Json(comment.into()))
}

/// PATCH /titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn update_comment<R>(
    State(state): State<CatalogAppState<R>>,
    requester: Requester,
    Path((title_id, review_id, comment_id)): Path<(TitleId, ReviewId, CommentId)>,
    ValidJson(req): ValidJson<CommentRequest>,
) -> CatalogResult<Json<CommentView>>
where
    R: CatalogRepository + Clone + Send + Sync + 'static,
{
    let use_case = CommentsUseCase::new(state.repo.clone());

    let comment = use_case
        .update(&requester, title_id, review_id, comment_id, req.into())
        .await?;

    Ok(Json(comment.into()))
}

/// DELETE /titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn delete_comment<R>(
    State(state): State<CatalogAppState<R>>,
    requester: Requester,
    Path((title_id, review_id, comment_id)): Path<(TitleId, ReviewId, CommentId)>,
) -> CatalogResult<StatusCode>
where
    R: CatalogRepository + Clone + Send + Sync + 'static,
{
    let use_case = CommentsUseCase::new(state.repo.clone());

    use_case
        .delete(&requester, title_id, review_id, comment_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
