use chrono::{DateTime, Utc};
use dfood_core::{Email, HashedPassword, User, UserId, UserProfile, UserStore, UserStoreError};
use secrecy::Secret;
use sqlx::{FromRow, PgPool};

#[derive(Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        PostgresUserStore { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    phone_number: String,
    first_time_login: bool,
    email_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserStoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = UserId::parse(row.id).map_err(unexpected)?;
        let email = Email::try_from(Secret::from(row.email)).map_err(unexpected)?;

        Ok(User::restore(
            id,
            email,
            HashedPassword::new(Secret::from(row.password_hash)),
            UserProfile {
                first_name: row.first_name,
                last_name: row.last_name,
                phone_number: row.phone_number,
            },
            row.first_time_login,
            row.email_verified,
            row.created_at,
            row.updated_at,
        ))
    }
}

const SELECT_USER: &str = r#"
    SELECT id, email, password_hash, first_name, last_name, phone_number,
           first_time_login, email_verified, created_at, updated_at
    FROM users
"#;

#[async_trait::async_trait]
impl UserStore for PostgresUserStore {
    #[tracing::instrument(name = "Retrieving user by email from PostgreSQL", skip_all)]
    async fn find_by_email(&self, email: &Email) -> Result<User, UserStoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;

        row.ok_or(UserStoreError::UserNotFound)?.try_into()
    }

    #[tracing::instrument(name = "Retrieving user by id from PostgreSQL", skip_all)]
    async fn find_by_id(&self, id: &UserId) -> Result<User, UserStoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;

        row.ok_or(UserStoreError::UserNotFound)?.try_into()
    }

    async fn exists_by_email(&self, email: &Email) -> Result<bool, UserStoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)
    }

    #[tracing::instrument(name = "Adding user to PostgreSQL", skip_all)]
    async fn insert(&self, user: User) -> Result<UserId, UserStoreError> {
        let query = sqlx::query(
            r#"
                INSERT INTO users (id, email, password_hash, first_name, last_name, phone_number,
                                   first_time_login, email_verified, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id().as_str())
        .bind(user.email().as_str())
        .bind(user.password_hash().as_str())
        .bind(&user.profile().first_name)
        .bind(&user.profile().last_name)
        .bind(&user.profile().phone_number)
        .bind(user.first_time_login())
        .bind(user.email_verified())
        .bind(user.created_at())
        .bind(user.updated_at());

        query.execute(&self.pool).await.map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return UserStoreError::UserAlreadyExists;
                }
            }
            unexpected(e)
        })?;

        Ok(user.id().clone())
    }

    #[tracing::instrument(name = "Set new password hash", skip_all)]
    async fn update_password_hash(
        &self,
        email: &Email,
        password_hash: HashedPassword,
    ) -> Result<(), UserStoreError> {
        let result = sqlx::query(
            r#"
                UPDATE users
                SET password_hash = $1, updated_at = $2
                WHERE email = $3
            "#,
        )
        .bind(password_hash.as_str())
        .bind(Utc::now())
        .bind(email.as_str())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(UserStoreError::UserNotFound);
        }

        Ok(())
    }

    #[tracing::instrument(name = "Delete user from PostgreSQL", skip_all)]
    async fn delete(&self, email: &Email) -> Result<(), UserStoreError> {
        let result = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email.as_str())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(UserStoreError::UserNotFound);
        }

        Ok(())
    }
}

fn unexpected(e: impl std::fmt::Display) -> UserStoreError {
    UserStoreError::UnexpectedError(e.to_string())
}
