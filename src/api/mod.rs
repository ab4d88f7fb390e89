//! API handlers for the Bookshelf REST endpoints

pub mod books;
pub mod borrows;
pub mod health;
pub mod openapi;
pub mod users;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;

use crate::{error::AppError, AppState};

/// Name of the session cookie set on register/login
pub const SESSION_COOKIE: &str = "session_id";

/// Extractor resolving the session cookie to a user id
pub struct SessionUser(pub i32);

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let token = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .ok_or_else(|| AppError::Authentication("Not logged in".to_string()))?;

        let user_id = state
            .services
            .sessions
            .resolve(&token)
            .await?
            .ok_or_else(|| AppError::Authentication("Session expired".to_string()))?;

        Ok(SessionUser(user_id))
    }
}
