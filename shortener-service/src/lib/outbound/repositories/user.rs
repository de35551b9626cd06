use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: Option<String>,
    email: String,
    password: String,
    salt: String,
    created_at: DateTime<Utc>,
}

/// Stored rows failing today's value-object rules are a storage problem,
/// never a client one.
impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let id = r.id;
        let corrupt = |field: &str, e: &dyn std::fmt::Display| {
            UserError::DatabaseError(format!("Stored user {id} has invalid {field}: {e}"))
        };

        // Older rows store a missing lastname as an empty string
        let lastname = r
            .last_name
            .filter(|name| !name.trim().is_empty())
            .map(PersonName::new)
            .transpose()
            .map_err(|e| corrupt("last_name", &e))?;

        Ok(User {
            id: UserId(id),
            firstname: PersonName::new(r.first_name).map_err(|e| corrupt("first_name", &e))?,
            lastname,
            email: EmailAddress::new(r.email).map_err(|e| corrupt("email", &e))?,
            password_hash: r.password,
            salt: r.salt,
            created_at: r.created_at,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, first_name, last_name, email, password, salt, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            "#,
        )
        .bind(user.id.0)
        .bind(user.firstname.as_str())
        .bind(user.lastname.as_ref().map(PersonName::as_str))
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(&user.salt)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key") {
                    return UserError::UserExists(user.email.as_str().to_string());
                }
            }
            UserError::DatabaseError(e.to_string())
        })?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, first_name, last_name, email, password, salt, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }
}
