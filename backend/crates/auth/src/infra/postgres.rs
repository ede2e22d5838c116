//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::error::conversions::unique_violation_constraint;
use kernel::id::UserId;
use platform::pagination::PageRequest;
use platform::search::contains_pattern;
use sqlx::PgPool;

use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, profile::Profile, user_name::UserName, user_role::UserRole,
    user_status::UserStatus,
};
use crate::error::{AuthError, AuthResult};

const USER_COLUMNS: &str = r#"
    id,
    user_name,
    email,
    user_role,
    user_status,
    is_staff,
    is_superuser,
    first_name,
    last_name,
    bio,
    created_at,
    updated_at
"#;

/// Role code as text, for `?search=` on role
const ROLE_CODE_SQL: &str =
    "CASE user_role WHEN 0 THEN 'user' WHEN 1 THEN 'moderator' ELSE 'admin' END";

/// Mean review score per title, `0` when no reviews remain
const REFRESH_RATINGS_SQL: &str = r#"
    UPDATE titles t
    SET rating = COALESCE(
        (SELECT AVG(r.score)::DOUBLE PRECISION FROM reviews r WHERE r.title_id = t.id),
        0
    )
    WHERE t.id = ANY($1)
"#;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &NewUser) -> AuthResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (
                user_name,
                email,
                user_role,
                user_status,
                first_name,
                last_name,
                bio
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.user_name.as_str())
        .bind(user.email.as_str())
        .bind(user.user_role.id())
        .bind(user.user_status.id())
        .bind(&user.profile.first_name)
        .bind(&user.profile.last_name)
        .bind(&user.profile.bio)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        row.into_user()
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_name = $1"
        ))
        .bind(user_name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn list(&self, search: Option<&str>, page: PageRequest) -> AuthResult<(Vec<User>, u64)> {
        let pattern = search.map(contains_pattern);
        let filter = format!(
            r#"
            $1::TEXT IS NULL
            OR user_name ILIKE $1
            OR email ILIKE $1
            OR {ROLE_CODE_SQL} ILIKE $1
            "#
        );

        let count = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM users WHERE {filter}"
        ))
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE {filter}
            ORDER BY user_name
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(pattern.as_deref())
        .bind(page.limit_i64())
        .bind(page.offset_i64())
        .fetch_all(&self.pool)
        .await?;

        let users = rows
            .into_iter()
            .map(UserRow::into_user)
            .collect::<AuthResult<Vec<_>>>()?;

        Ok((users, count.max(0) as u64))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                user_name = $2,
                email = $3,
                user_role = $4,
                user_status = $5,
                first_name = $6,
                last_name = $7,
                bio = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(user.id.get())
        .bind(user.user_name.as_str())
        .bind(user.email.as_str())
        .bind(user.user_role.id())
        .bind(user.user_status.id())
        .bind(&user.profile.first_name)
        .bind(&user.profile.last_name)
        .bind(&user.profile.bio)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }

    /// Deleting a user cascades to their reviews, so the ratings of the
    /// titles they reviewed are recomputed in the same transaction.
    async fn delete(&self, user_id: UserId) -> AuthResult<bool> {
        let mut tx = self.pool.begin().await?;

        let title_ids = sqlx::query_scalar::<_, i64>(
            "SELECT DISTINCT title_id FROM reviews WHERE author_id = $1",
        )
        .bind(user_id.get())
        .fetch_all(&mut *tx)
        .await?;

        if !title_ids.is_empty() {
            sqlx::query("SELECT id FROM titles WHERE id = ANY($1) ORDER BY id FOR UPDATE")
                .bind(title_ids.as_slice())
                .execute(&mut *tx)
                .await?;
        }

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id.get())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if !title_ids.is_empty() {
            sqlx::query(REFRESH_RATINGS_SQL)
                .bind(title_ids.as_slice())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        if !title_ids.is_empty() {
            tracing::info!(
                user_id = %user_id,
                titles = title_ids.len(),
                "Ratings refreshed after removing reviewer"
            );
        }
        Ok(deleted > 0)
    }
}

/// Lost uniqueness race: report it like the pre-check would
fn map_unique_violation(err: sqlx::Error) -> AuthError {
    let field = match unique_violation_constraint(&err) {
        Some("users_user_name_key") => {
            Some(("username", "A user with that username already exists."))
        }
        Some("users_email_key") => Some(("email", "A user with that email already exists.")),
        _ => None,
    };

    match field {
        Some((field, message)) => AuthError::field(field, message),
        None => AuthError::Database(err),
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    user_name: String,
    email: String,
    user_role: i16,
    user_status: i16,
    is_staff: bool,
    is_superuser: bool,
    first_name: String,
    last_name: String,
    bio: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let user_role = UserRole::from_id(self.user_role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid user role: {}", self.user_role)))?;
        let user_status = UserStatus::from_id(self.user_status).ok_or_else(|| {
            AuthError::Internal(format!("Invalid user status: {}", self.user_status))
        })?;

        Ok(User {
            id: UserId::new(self.id),
            user_name: UserName::from_db(self.user_name),
            email: Email::from_db(self.email),
            user_role,
            user_status,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
            profile: Profile {
                first_name: self.first_name,
                last_name: self.last_name,
                bio: self.bio,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
