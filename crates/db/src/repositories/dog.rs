use crate::models::DbDog;
use crate::repositories::is_foreign_key_violation;
use pawbook_core::models::dog::{DogChanges, DogRemoval, NewDog};
use eyre::Result;
use sqlx::{PgExecutor, Pool, Postgres};
use uuid::Uuid;

pub async fn insert_dog<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    dog: &NewDog,
) -> Result<DbDog> {
    let dog = sqlx::query_as::<_, DbDog>(
        r#"
        INSERT INTO dogs (user_id, name, breed, age)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, name, breed, age
        "#,
    )
    .bind(user_id)
    .bind(&dog.name)
    .bind(&dog.breed)
    .bind(dog.age)
    .fetch_one(executor)
    .await?;

    Ok(dog)
}

pub async fn get_dog_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbDog>> {
    let dog = sqlx::query_as::<_, DbDog>(
        r#"
        SELECT id, user_id, name, breed, age
        FROM dogs
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(dog)
}

pub async fn get_dogs_by_user_id(pool: &Pool<Postgres>, user_id: Uuid) -> Result<Vec<DbDog>> {
    let dogs = sqlx::query_as::<_, DbDog>(
        r#"
        SELECT id, user_id, name, breed, age
        FROM dogs
        WHERE user_id = $1
        ORDER BY name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(dogs)
}

pub async fn update_dog(
    pool: &Pool<Postgres>,
    id: Uuid,
    changes: &DogChanges,
) -> Result<Option<DbDog>> {
    // A null in the request clears the column; an absent field keeps it.
    let dog = sqlx::query_as::<_, DbDog>(
        r#"
        UPDATE dogs
        SET name = COALESCE($2, name),
            breed = CASE WHEN $3 THEN $4 ELSE breed END,
            age = CASE WHEN $5 THEN $6 ELSE age END
        WHERE id = $1
        RETURNING id, user_id, name, breed, age
        "#,
    )
    .bind(id)
    .bind(&changes.name)
    .bind(changes.breed.is_some())
    .bind(changes.breed.clone().flatten())
    .bind(changes.age.is_some())
    .bind(changes.age.flatten())
    .fetch_optional(pool)
    .await?;

    Ok(dog)
}

/// Deletes a dog that no appointment references.
///
/// The reference check is part of the `DELETE` itself. A booking that commits
/// between that check and the row delete trips the foreign key instead, which
/// is reported as [`DogRemoval::InUse`] too.
pub async fn delete_dog(pool: &Pool<Postgres>, id: Uuid) -> Result<DogRemoval> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query_scalar::<_, Uuid>(
        r#"
        DELETE FROM dogs
        WHERE id = $1
          AND NOT EXISTS (SELECT 1 FROM appointments WHERE dog_id = $1)
        RETURNING id
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(eyre::Report::from);

    let removal = match deleted {
        Ok(Some(_)) => DogRemoval::Deleted,
        Ok(None) => {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT 1 FROM dogs WHERE id = $1)",
            )
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
            if exists { DogRemoval::InUse } else { DogRemoval::Missing }
        }
        Err(report) if is_foreign_key_violation(&report) => return Ok(DogRemoval::InUse),
        Err(report) => return Err(report),
    };

    tx.commit().await?;
    Ok(removal)
}
