use crate::models::{DbDog, DbUser};
use crate::repositories::dog;
use pawbook_core::models::{dog::NewDog, user::NewUser};
use eyre::Result;
use sqlx::{PgExecutor, Pool, Postgres};
use uuid::Uuid;

pub async fn insert_user<'e>(
    executor: impl PgExecutor<'e>,
    user: &NewUser,
) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        INSERT INTO users (full_name, email, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO NOTHING
        RETURNING id, full_name, email, password_hash, created_at
        "#,
    )
    .bind(&user.full_name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}

/// Registers a user and, optionally, their first dog in one transaction.
/// `None` when the email is taken.
pub async fn register_user(
    pool: &Pool<Postgres>,
    user: &NewUser,
    first_dog: Option<&NewDog>,
) -> Result<Option<(DbUser, Option<DbDog>)>> {
    let mut tx = pool.begin().await?;

    let Some(user) = insert_user(&mut *tx, user).await? else {
        return Ok(None);
    };
    let dog = match first_dog {
        Some(new_dog) => Some(dog::insert_dog(&mut *tx, user.id, new_dog).await?),
        None => None,
    };

    tx.commit().await?;
    Ok(Some((user, dog)))
}

pub async fn get_user_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, full_name, email, password_hash, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_email(pool: &Pool<Postgres>, email: &str) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, full_name, email, password_hash, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}
