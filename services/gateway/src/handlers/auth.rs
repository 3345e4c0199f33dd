use crate::auth::{AdminUser, AuthenticatedUser, Role};
use crate::error::AppError;
use crate::extract::ApiJson;
use crate::models::{
    AuthResponse, LoginRequest, RegisterRequest, UserInfo, UserListResponse, UserResponse, messages,
};
use crate::state::AppState;
use crate::store::StoreError;
use crate::store::users::{User, hash_password, normalize_email, verify_password};
use axum::{Json, extract::State, http::StatusCode};

const MIN_PASSWORD_LEN: usize = 8;

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let email = normalize_email(&req.email);
    if !is_plausible_email(&email) {
        return Err(AppError::Validation(messages::INVALID_EMAIL.to_string()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(messages::WEAK_PASSWORD.to_string()));
    }

    let name = req.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    let user = User::new(&email, name, Role::User, hash_password(&req.password)?);

    match state.users.insert(user.clone()).await {
        Ok(()) => {}
        Err(StoreError::Duplicate(_)) => {
            return Err(AppError::Conflict(messages::EMAIL_TAKEN.to_string()));
        }
        Err(e) => return Err(AppError::InternalError(e.into())),
    }

    let token = state.jwt.issue(&user)?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            token,
            user: UserInfo::from(&user),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state
        .users
        .find_by_email(&req.email)
        .await
        .map_err(|e| AppError::InternalError(e.into()))?;

    // Same answer for unknown email and wrong password.
    let Some(user) = user.filter(|u| verify_password(&req.password, &u.password_hash)) else {
        tracing::warn!("Failed login attempt");
        return Err(AppError::Unauthorized(messages::INVALID_CREDENTIALS.to_string()));
    };

    let token = state.jwt.issue(&user)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        success: true,
        token,
        user: UserInfo::from(&user),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .users
        .find_by_id(&user.user_id)
        .await
        .map_err(|e| AppError::InternalError(e.into()))?
        .ok_or_else(|| AppError::Unauthorized(messages::INVALID_TOKEN.to_string()))?;

    Ok(Json(UserResponse {
        success: true,
        user: UserInfo::from(&user),
    }))
}

pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<UserListResponse>, AppError> {
    let users = state
        .users
        .list()
        .await
        .map_err(|e| AppError::InternalError(e.into()))?;

    tracing::debug!(admin = %admin.user_id, count = users.len(), "Listed users");

    Ok(Json(UserListResponse {
        success: true,
        users: users.iter().map(UserInfo::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape() {
        assert!(is_plausible_email("ana@example.com"));
        assert!(!is_plausible_email("ana.example.com"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("ana@localhost"));
        assert!(!is_plausible_email("ana maria@example.com"));
    }
}
