//! Auth Middleware
//!
//! Resolves the bearer token on every request into a [`Requester`] stored in
//! the request extensions. Handlers extract it with `Requester` as an
//! argument; requests that never passed the middleware are anonymous.

use axum::body::Body;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::convert::Infallible;
use std::sync::Arc;

use crate::application::AuthenticateUseCase;
use crate::application::config::AuthConfig;
use crate::domain::policy::Requester;
use crate::domain::repository::UserRepository;
use crate::error::AuthError;

const BEARER_PREFIX: &str = "Bearer ";

/// Middleware state
#[derive(Clone)]
pub struct RequesterState<R>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

/// Middleware that resolves `Authorization: Bearer <token>`
///
/// - no header, or another scheme: anonymous
/// - valid token for an active user: authenticated
/// - anything else: 401
pub async fn resolve_requester<R>(
    state: RequesterState<R>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(|token| token.trim().to_string());

    let requester = match token {
        None => Requester::Anonymous,
        Some(token) if token.is_empty() => return AuthError::InvalidToken.into_response(),
        Some(token) => {
            let use_case = AuthenticateUseCase::new(state.repo.clone(), state.config.clone());
            match use_case.execute(&token).await {
                Ok(principal) => Requester::Authenticated(principal),
                Err(e) => return e.into_response(),
            }
        }
    };

    req.extensions_mut().insert(requester);
    next.run(req).await
}

impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Requester>()
            .cloned()
            .unwrap_or_default())
    }
}
