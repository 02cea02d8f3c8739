//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// User roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Member => "Member",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// SQLx conversion for Role (stored as text)
impl sqlx::Type<Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Hashed password (argon2), never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(length(min = 1, max = 50, message = "Username must be 1-50 characters"))]
    pub username: String,
    #[validate(length(min = 6, max = 100, message = "Password must be 6-100 characters"))]
    pub password: String,
    pub role: Option<Role>,
}

/// Update user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 50, message = "Username must be 1-50 characters"))]
    pub username: String,
    #[validate(length(min = 6, max = 100, message = "Password must be 6-100 characters"))]
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Subject: user id
    pub sub: String,
    /// Username
    pub name: String,
    pub role: Role,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and validate a JWT token.
    ///
    /// Checks signature, issuer, audience and expiry; a token failing any of
    /// the four is rejected.
    pub fn from_token(
        token: &str,
        secret: &str,
        issuer: &str,
        audience: &str,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let mut validation = Validation::default();
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;
        Ok(token_data.claims)
    }

    /// Check if user is admin
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Administrator privileges required".to_string(),
            ))
        }
    }

    /// Numeric user id from the subject claim
    pub fn user_id(&self) -> Result<i32, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::Authentication("Invalid token subject".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const SECRET: &str = "test-secret-at-least-32-bytes-long!!";
    const ISSUER: &str = "librarium-server";
    const AUDIENCE: &str = "librarium-client";

    fn claims_expiring_in(seconds: i64) -> UserClaims {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: "42".to_string(),
            name: "admin".to_string(),
            role: Role::Admin,
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
            exp: now + seconds,
            iat: now,
        }
    }

    #[test]
    fn token_round_trip() {
        let claims = claims_expiring_in(3600);
        let token = claims.create_token(SECRET).unwrap();

        let decoded = UserClaims::from_token(&token, SECRET, ISSUER, AUDIENCE).unwrap();
        assert_eq!(decoded.sub, "42");
        assert_eq!(decoded.name, "admin");
        assert_eq!(decoded.role, Role::Admin);
        assert_eq!(decoded.user_id().unwrap(), 42);
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = claims_expiring_in(-3600);
        let token = claims.create_token(SECRET).unwrap();

        assert!(UserClaims::from_token(&token, SECRET, ISSUER, AUDIENCE).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = claims_expiring_in(3600);
        let token = claims.create_token(SECRET).unwrap();

        let result =
            UserClaims::from_token(&token, "another-secret-also-32-bytes-long!!!", ISSUER, AUDIENCE);
        assert!(result.is_err());
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let claims = claims_expiring_in(3600);
        let token = claims.create_token(SECRET).unwrap();

        assert!(UserClaims::from_token(&token, SECRET, "someone-else", AUDIENCE).is_err());
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let claims = claims_expiring_in(3600);
        let token = claims.create_token(SECRET).unwrap();

        assert!(UserClaims::from_token(&token, SECRET, ISSUER, "someone-else").is_err());
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert!(UserClaims::from_token("not.a.token", SECRET, ISSUER, AUDIENCE).is_err());
    }

    #[test]
    fn role_parsing() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Member".parse::<Role>().unwrap(), Role::Member);
        assert!("librarian".parse::<Role>().is_err());
        assert_eq!(Role::Admin.as_str(), "Admin");
    }

    #[test]
    fn non_admin_claims_fail_require_admin() {
        let mut claims = claims_expiring_in(3600);
        claims.role = Role::Member;
        assert!(claims.require_admin().is_err());
        assert!(!claims.is_admin());
    }
}
