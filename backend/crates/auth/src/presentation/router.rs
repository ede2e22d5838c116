//! Auth Router
//!
//! `/auth/*` (signup, token) and `/users/*` (management).

use axum::{
    Router,
    routing::{get, post},
};
use platform::mail::{AppMailer, Mailer};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::UserRepository;
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAuthRepository, mailer: AppMailer, config: AuthConfig) -> Router {
    auth_router_generic(repo, mailer, config)
}

/// Create a generic Auth router for any repository and mailer implementation
pub fn auth_router_generic<R, M>(repo: R, mailer: M, config: AuthConfig) -> Router
where
    R: UserRepository + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        mailer: Arc::new(mailer),
        config: Arc::new(config),
    };

    Router::new()
        .route("/auth/signup", post(handlers::sign_up::<R, M>))
        .route("/auth/token", post(handlers::obtain_token::<R, M>))
        .route(
            "/users",
            get(handlers::list_users::<R, M>).post(handlers::create_user::<R, M>),
        )
        .route(
            "/users/me",
            get(handlers::me::<R, M>).patch(handlers::update_me::<R, M>),
        )
        .route(
            "/users/{username}",
            get(handlers::get_user::<R, M>)
                .patch(handlers::update_user::<R, M>)
                .delete(handlers::delete_user::<R, M>),
        )
        .with_state(state)
}
