//! User and session endpoints

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{LoginRequest, RegisterRequest, User},
};

use super::{SessionUser, SESSION_COOKIE};

/// Response wrapping a list of users
#[derive(Serialize, ToSchema)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

/// Response wrapping a single user
#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub user: User,
}

/// Generic success response
#[derive(Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

/// List all users (passwords are never serialized)
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "List of users", body = UsersResponse)
    )
)]
pub async fn list_users(State(state): State<crate::AppState>) -> AppResult<Json<UsersResponse>> {
    let users = state.services.users.list().await?;
    Ok(Json(UsersResponse { users }))
}

/// Get the profile of the logged-in user
#[utoipa::path(
    get,
    path = "/users/profile",
    tag = "users",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "User not found")
    )
)]
pub async fn profile(
    State(state): State<crate::AppState>,
    SessionUser(user_id): SessionUser,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.users.get_by_id(user_id).await?;
    Ok(Json(UserResponse { user }))
}

/// Register a new user and open a session
#[utoipa::path(
    post,
    path = "/users/register",
    tag = "users",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User created, session opened", body = UserResponse),
        (status = 400, description = "User already exists or invalid input")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(CookieJar, Json<UserResponse>)> {
    let user = state.services.users.register(request).await?;
    let token = state.services.sessions.create(user.id).await?;

    Ok((
        jar.add(session_cookie(token)),
        Json(UserResponse { user }),
    ))
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/users/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session opened", body = UserResponse),
        (status = 400, description = "Invalid password"),
        (status = 404, description = "User not found")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<UserResponse>)> {
    let user = state.services.users.login(request).await?;
    let token = state.services.sessions.create(user.id).await?;

    Ok((
        jar.add(session_cookie(token)),
        Json(UserResponse { user }),
    ))
}

/// Log out, invalidating the session
#[utoipa::path(
    get,
    path = "/users/logout",
    tag = "users",
    responses(
        (status = 200, description = "Session closed", body = SuccessResponse)
    )
)]
pub async fn logout(
    State(state): State<crate::AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<SuccessResponse>)> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.services.sessions.revoke(cookie.value()).await?;
    }

    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");

    Ok((jar.remove(removal), Json(SuccessResponse { success: true })))
}
