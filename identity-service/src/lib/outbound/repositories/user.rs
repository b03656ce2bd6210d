use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const USER_COLUMNS: &str = "id, first_name, last_name, email, username, password_hash, \
                            is_active, is_verified, last_login, created_at, updated_at";

#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    username: String,
    password_hash: String,
    is_active: bool,
    is_verified: bool,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, UserError> {
        let id = self.id;
        let corrupt = |field: &str, e: &dyn std::fmt::Display| {
            UserError::DatabaseError(format!("Stored user {} has invalid {}: {}", id, field, e))
        };

        Ok(User {
            id: UserId(id),
            first_name: PersonName::new(self.first_name).map_err(|e| corrupt("first_name", &e))?,
            last_name: PersonName::new(self.last_name).map_err(|e| corrupt("last_name", &e))?,
            email: EmailAddress::new(self.email).map_err(|e| corrupt("email", &e))?,
            username: Username::new(self.username).map_err(|e| corrupt("username", &e))?,
            password_hash: self.password_hash,
            is_active: self.is_active,
            is_verified: self.is_verified,
            last_login: self.last_login,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn database_error(e: sqlx::Error) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique").to_string();
            return UserError::ConstraintViolation(constraint);
        }
    }
    tracing::error!(error = %e, database = "postgresql", "Query failed");
    UserError::DatabaseError(e.to_string())
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, user: User) -> Result<User, UserError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, first_name, last_name, email, username, password_hash,
                               is_active, is_verified, last_login, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id.0)
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_str())
        .bind(user.email.as_str())
        .bind(user.username.as_str())
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.is_verified)
        .bind(user.last_login)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(database_error)?;

        row.into_user()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_login(&self, identifier: &str) -> Result<Option<User>, UserError> {
        // One row may match by username and another by email; the username match wins.
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {}
            FROM users
            WHERE username = $1 OR email = $1
            ORDER BY (username = $1) DESC
            LIMIT 1
            "#,
            USER_COLUMNS
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn exists_by_email_or_username(
        &self,
        email: &EmailAddress,
        username: &Username,
    ) -> Result<bool, UserError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 OR username = $2)",
        )
        .bind(email.as_str())
        .bind(username.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(database_error)
    }

    async fn update_last_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<User, UserError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET last_login = $2, updated_at = $2
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id.0)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(UserRow::into_user)
            .transpose()?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    async fn set_active(&self, id: &UserId, active: bool) -> Result<User, UserError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id.0)
        .bind(active)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(UserRow::into_user)
            .transpose()?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }
}
