use crate::error::AppError;
use crate::models::messages;
use crate::state::AppState;
use crate::store::User;
use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use types::ids::UserId;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Issues and verifies HS256 access tokens.
#[derive(Clone)]
pub struct JwtAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl JwtAuth {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry: Duration::hours(expiry_hours),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.expiry).timestamp(),
            jti: Uuid::now_v7().to_string(),
        };
        self.sign(&claims)
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Token signing failed: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected access token");
                AppError::Unauthorized(messages::INVALID_TOKEN.to_string())
            })
    }
}

/// Caller identity resolved from a `Bearer` token.
///
/// The account must still exist; role is read from the store so a demotion
/// takes effect before the token expires.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(Authorization(bearer)) = parts.headers.typed_get::<Authorization<Bearer>>() else {
            return Err(AppError::Unauthorized(messages::MISSING_TOKEN.to_string()));
        };

        let claims = state.jwt.verify(bearer.token())?;

        let user = state
            .users
            .find_by_id(&claims.sub)
            .await
            .map_err(|e| AppError::InternalError(e.into()))?
            .ok_or_else(|| {
                tracing::warn!(user_id = %claims.sub, "Token for unknown user");
                AppError::Unauthorized(messages::INVALID_TOKEN.to_string())
            })?;

        Ok(AuthenticatedUser {
            user_id: user.id,
            email: user.email,
            role: user.role,
        })
    }
}

/// An [`AuthenticatedUser`] with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            tracing::warn!(user_id = %user.user_id, "Non-admin denied admin route");
            return Err(AppError::Forbidden(messages::ADMIN_ONLY.to_string()));
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User::new("trader@example.com", None, role, "hash".into())
    }

    #[test]
    fn test_issue_then_verify() {
        let auth = JwtAuth::new("secret-a", 24);
        let user = user(Role::Admin);
        let token = auth.issue(&user).unwrap();

        let claims = auth.verify(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.email, "trader@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_other_secret_rejected() {
        let token = JwtAuth::new("secret-a", 24).issue(&user(Role::User)).unwrap();
        let err = JwtAuth::new("secret-b", 24).verify(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = JwtAuth::new("secret-a", 24);
        let user = user(Role::User);
        let issued = Utc::now() - Duration::hours(48);
        let token = auth
            .sign(&Claims {
                sub: user.id,
                email: user.email.clone(),
                role: user.role,
                iat: issued.timestamp(),
                exp: (issued + Duration::hours(24)).timestamp(),
                jti: Uuid::now_v7().to_string(),
            })
            .unwrap();

        assert!(matches!(auth.verify(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let auth = JwtAuth::new("secret-a", 24);
        assert!(auth.verify("not.a.jwt").is_err());
    }
}
