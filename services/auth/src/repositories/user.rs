//! User repository for database operations

use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use crate::models::{NewUser, User};

/// Name of the primary key guarding duplicate user ids
pub const USER_ID_CONSTRAINT: &str = "users_pkey";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whether a user with this id already exists
    pub async fn exists(&self, id: &str) -> DatabaseResult<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::query)
    }

    /// Create a new user
    ///
    /// A duplicate id surfaces as a conflict on [`USER_ID_CONSTRAINT`].
    pub async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        info!("Creating new user: {}", new_user.id);

        let row = sqlx::query(
            r#"
            INSERT INTO users (id, password_hash, nickname)
            VALUES ($1, $2, $3)
            RETURNING id, password_hash, nickname, created_at
            "#,
        )
        .bind(&new_user.id)
        .bind(&new_user.password_hash)
        .bind(&new_user.nickname)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::query)?;

        user_from_row(&row).map_err(DatabaseError::query)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, password_hash, nickname, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::query)?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(DatabaseError::query)
    }

    /// Update a user's nickname, returning false when the user is gone
    pub async fn update_nickname(&self, id: &str, nickname: &str) -> DatabaseResult<bool> {
        info!("Updating nickname for user: {}", id);

        let result = sqlx::query("UPDATE users SET nickname = $1 WHERE id = $2")
            .bind(nickname)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::query)?;

        Ok(result.rows_affected() > 0)
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        password_hash: row.try_get("password_hash")?,
        nickname: row.try_get("nickname")?,
        created_at: row.try_get("created_at")?,
    })
}
