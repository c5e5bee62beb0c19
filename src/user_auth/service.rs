use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::error::AuthError;
use super::store::{NewUser, UserResponse, UserStore};

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (username, also the account owner)
    pub exp: usize,  // Expiration time (as UTC timestamp)
    pub iat: usize,  // Issued at
}

/// User Registration Request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32))]
    #[schema(example = "alice")]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    #[schema(example = "Alice Liddell")]
    pub full_name: String,
    #[validate(email)]
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[validate(length(min = 8))]
    #[schema(example = "password123")]
    pub password: String,
}

/// User Login Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "password123")]
    pub password: String,
}

/// Login Response (JWT)
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

pub struct UserAuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
    token_ttl: Duration,
}

impl UserAuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: String, token_ttl: Duration) -> Self {
        Self {
            users,
            jwt_secret,
            token_ttl,
        }
    }

    /// Register a new user
    pub async fn register(&self, req: RegisterRequest) -> Result<UserResponse, AuthError> {
        req.validate()?;
        if !req
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AuthError::InvalidParameter(
                "username: letters, digits and underscore only".to_string(),
            ));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hashed_password = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hash(e.to_string()))?
            .to_string();

        let user = self
            .users
            .create_user(NewUser {
                username: req.username,
                full_name: req.full_name,
                email: req.email,
                hashed_password,
            })
            .await?;

        tracing::info!(username = %user.username, "User registered");
        Ok(user.into())
    }

    /// Login user and issue JWT
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AuthError> {
        let user = self
            .users
            .get_user(&req.username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let parsed_hash = PasswordHash::new(&user.hashed_password)
            .map_err(|e| AuthError::Hash(e.to_string()))?;
        Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;

        let (access_token, expires_at) = self.issue_token(&user.username)?;
        Ok(LoginResponse {
            access_token,
            expires_at,
            user: user.into(),
        })
    }

    /// Sign an HS256 token for `username`
    pub fn issue_token(&self, username: &str) -> Result<(String, DateTime<Utc>), AuthError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: username.to_string(),
            exp: expires_at.timestamp().max(0) as usize,
            iat: now.timestamp().max(0) as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;
        Ok((token, expires_at))
    }

    /// Verify JWT token
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        let token_data =
            decode::<Claims>(token, &decoding_key, &validation).map_err(|_| AuthError::InvalidToken)?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user_auth::MemoryUserStore;

    fn service() -> UserAuthService {
        UserAuthService::new(
            Arc::new(MemoryUserStore::new()),
            "test-secret".to_string(),
            Duration::hours(1),
        )
    }

    fn register_request(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            full_name: "Alice Liddell".to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let svc = service();
        let user = svc
            .register(register_request("alice", "alice@example.com"))
            .await
            .unwrap();
        assert_eq!(user.username, "alice");

        let resp = svc
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();
        assert!(resp.expires_at > Utc::now());

        let claims = svc.verify_token(&resp.access_token).unwrap();
        assert_eq!(claims.sub, "alice");
    }

    #[tokio::test]
    async fn test_register_validation() {
        let svc = service();

        let err = svc
            .register(register_request("alice", "not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidParameter(_)));

        let err = svc
            .register(register_request("al", "alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidParameter(_)));

        let err = svc
            .register(register_request("alice smith", "alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidParameter(_)));

        let mut short = register_request("alice", "alice@example.com");
        short.password = "short".to_string();
        assert!(matches!(
            svc.register(short).await,
            Err(AuthError::InvalidParameter(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_user() {
        let svc = service();
        svc.register(register_request("alice", "alice@example.com"))
            .await
            .unwrap();
        let err = svc
            .register(register_request("alice", "alice2@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserExists));
    }

    #[tokio::test]
    async fn test_login_wrong_password_or_user() {
        let svc = service();
        svc.register(register_request("alice", "alice@example.com"))
            .await
            .unwrap();

        let err = svc
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = svc
            .login(LoginRequest {
                username: "nobody".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_verify_rejects_foreign_and_expired_tokens() {
        let svc = service();
        let (token, _) = svc.issue_token("alice").unwrap();

        let other = UserAuthService::new(
            Arc::new(MemoryUserStore::new()),
            "other-secret".to_string(),
            Duration::hours(1),
        );
        assert!(matches!(
            other.verify_token(&token),
            Err(AuthError::InvalidToken)
        ));

        let expired = UserAuthService::new(
            Arc::new(MemoryUserStore::new()),
            "test-secret".to_string(),
            Duration::hours(-2),
        );
        let (stale, _) = expired.issue_token("alice").unwrap();
        assert!(matches!(
            svc.verify_token(&stale),
            Err(AuthError::InvalidToken)
        ));

        assert!(matches!(
            svc.verify_token("garbage"),
            Err(AuthError::InvalidToken)
        ));
    }
}
