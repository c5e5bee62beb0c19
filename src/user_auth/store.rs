//! User persistence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use utoipa::ToSchema;

use super::error::AuthError;
use crate::ledger::error::{LedgerError, sqlstate};

/// Stored user row
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

/// User as returned over the API (no password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "Alice Liddell")]
    pub full_name: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Insert payload; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub hashed_password: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `UserExists` when the username or email is taken
    async fn create_user(&self, user: NewUser) -> Result<User, AuthError>;

    async fn get_user(&self, username: &str) -> Result<Option<User>, AuthError>;
}

/// `users` table
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AuthError> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (username, full_name, email, hashed_password)
               VALUES ($1, $2, $3, $4)
               RETURNING username, full_name, email, hashed_password, created_at"#,
        )
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match LedgerError::sqlstate(&e).as_deref() {
            Some(sqlstate::UNIQUE_VIOLATION) => AuthError::UserExists,
            _ => AuthError::Database(e),
        })
    }

    async fn get_user(&self, username: &str) -> Result<Option<User>, AuthError> {
        let row = sqlx::query_as::<_, User>(
            r#"SELECT username, full_name, email, hashed_password, created_at
               FROM users WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

/// In-process user table for tests and `--memory` mode
///
/// Usernames and emails are both unique. An email is claimed first and
/// released again if the username turns out to be taken.
#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<String, User>,
    /// email -> username
    emails: DashMap<String, String>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AuthError> {
        match self.emails.entry(user.email.clone()) {
            MapEntry::Occupied(_) => return Err(AuthError::UserExists),
            MapEntry::Vacant(slot) => {
                slot.insert(user.username.clone());
            }
        }

        match self.users.entry(user.username.clone()) {
            MapEntry::Occupied(_) => {
                self.emails.remove(&user.email);
                Err(AuthError::UserExists)
            }
            MapEntry::Vacant(slot) => {
                let row = User {
                    username: user.username,
                    full_name: user.full_name,
                    email: user.email,
                    hashed_password: user.hashed_password,
                    created_at: Utc::now(),
                };
                slot.insert(row.clone());
                Ok(row)
            }
        }
    }

    async fn get_user(&self, username: &str) -> Result<Option<User>, AuthError> {
        Ok(self.users.get(username).map(|u| u.value().clone()))
    }
}
