//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use kernel::extract::ValidJson;
use platform::mail::Mailer;
use platform::pagination::Page;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{ManageUsersUseCase, ObtainTokenUseCase, SignUpUseCase};
use crate::domain::policy::Requester;
use crate::domain::repository::UserRepository;
use crate::error::AuthResult;
use crate::presentation::dto::{
    SignUpRequest, SignUpResponse, TokenRequest, TokenResponse, UserListQuery, UserRequest,
    UserResponse,
};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R, M>
where
    R: UserRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /auth/signup
pub async fn sign_up<R, M>(
    State(state): State<AuthAppState<R, M>>,
    ValidJson(req): ValidJson<SignUpRequest>,
) -> AuthResult<Json<SignUpResponse>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    let output = use_case.execute(req.into_input()?).await?;

    Ok(Json(output.into()))
}

// ============================================================================
// Token
// ============================================================================

/// POST /auth/token
pub async fn obtain_token<R, M>(
    State(state): State<AuthAppState<R, M>>,
    ValidJson(req): ValidJson<TokenRequest>,
) -> AuthResult<Json<TokenResponse>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let use_case = ObtainTokenUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case.execute(req.into_input()?).await?;

    Ok(Json(TokenResponse {
        token: output.token,
    }))
}

// ============================================================================
// Users (admin)
// ============================================================================

/// GET /users
pub async fn list_users<R, M>(
    State(state): State<AuthAppState<R, M>>,
    requester: Requester,
    Query(query): Query<UserListQuery>,
) -> AuthResult<Json<Page<UserResponse>>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let page = query.page().resolve(state.config.default_page_size);
    let use_case = ManageUsersUseCase::new(state.repo.clone());

    let users = use_case
        .list(&requester, query.search.as_deref(), page)
        .await?;

    Ok(Json(users.map(UserResponse::from)))
}

/// POST /users
pub async fn create_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    requester: Requester,
    ValidJson(req): ValidJson<UserRequest>,
) -> AuthResult<(StatusCode, Json<UserResponse>)>
where
    R: UserRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let use_case = ManageUsersUseCase::new(state.repo.clone());

    let user = use_case.create(&requester, req.into()).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /users/{username}
pub async fn get_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    requester: Requester,
    Path(user_name): Path<String>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let use_case = ManageUsersUseCase::new(state.repo.clone());

    let user = use_case.get(&requester, &user_name).await?;

    Ok(Json(user.into()))
}

/// PATCH /users/{username}
pub async fn update_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    requester: Requester,
    Path(user_name): Path<String>,
    ValidJson(req): ValidJson<UserRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let use_case = ManageUsersUseCase::new(state.repo.clone());

    let user = use_case.update(&requester, &user_name, req.into()).await?;

    Ok(Json(user.into()))
}

/// DELETE /users/{username}
pub async fn delete_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    requester: Requester,
    Path(user_name): Path<String>,
) -> AuthResult<StatusCode>
where
    R: UserRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let use_case = ManageUsersUseCase::new(state.repo.clone());

    use_case.delete(&requester, &user_name).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Users (self-service)
// ============================================================================

/// GET /users/me
pub async fn me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    requester: Requester,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let use_case = ManageUsersUseCase::new(state.repo.clone());

    let user = use_case.me(&requester).await?;

    Ok(Json(user.into()))
}

/// PATCH /users/me
pub async fn update_me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    requester: Requester,
    ValidJson(req): ValidJson<UserRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let use_case = ManageUsersUseCase::new(state.repo.clone());

    let user = use_case.update_me(&requester, req.into()).await?;

    Ok(Json(user.into()))
}
