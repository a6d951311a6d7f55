// src/people.rs
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::{Person, PersonFields};

#[async_trait]
pub trait PersonRepository: Send + Sync {
    async fn find(&self, id: i64) -> Result<Option<Person>, StoreError>;

    /// Fails with `StoreError::DuplicateEmail` if the email is taken.
    async fn create(&self, fields: PersonFields) -> Result<Person, StoreError>;

    /// Overwrites every field of the stored record with `person`'s values.
    async fn save(&self, person: &Person) -> Result<(), StoreError>;
}

pub struct PgPersonRepository {
    pool: PgPool,
}

impl PgPersonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersonRepository for PgPersonRepository {
    async fn find(&self, id: i64) -> Result<Option<Person>, StoreError> {
        let person = sqlx::query_as::<_, Person>(
            "SELECT id, email, first_name, last_name FROM people WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(person)
    }

    async fn create(&self, fields: PersonFields) -> Result<Person, StoreError> {
        sqlx::query_as::<_, Person>(
            r#"
            INSERT INTO people (email, first_name, last_name)
            VALUES ($1, $2, $3)
            RETURNING id, email, first_name, last_name
            "#,
        )
        .bind(&fields.email)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_insert)
    }

    async fn save(&self, person: &Person) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE people
            SET email = $1, first_name = $2, last_name = $3
            WHERE id = $4
            "#,
        )
        .bind(&person.email)
        .bind(&person.first_name)
        .bind(&person.last_name)
        .bind(person.id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_insert)?;

        Ok(())
    }
}

// Run against a live database with `DATABASE_URL` set and `cargo test -- --ignored`.
#[cfg(test)]
mod tests {
    use super::*;

    fn fields(email: &str, first: &str, last: &str) -> PersonFields {
        PersonFields {
            email: email.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn unique_violation_maps_to_duplicate_email(pool: PgPool) {
        let repo = PgPersonRepository::new(pool);
        repo.create(fields("ann@example.com", "Ann", "Lee"))
            .await
            .unwrap();

        let err = repo
            .create(fields("ann@example.com", "Other", "Person"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));

        let mut bob = repo
            .create(fields("bob@example.com", "Bob", "Ray"))
            .await
            .unwrap();
        bob.email = "ann@example.com".to_string();
        assert!(matches!(
            repo.save(&bob).await.unwrap_err(),
            StoreError::DuplicateEmail
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn save_overwrites_every_field(pool: PgPool) {
        let repo = PgPersonRepository::new(pool);
        let mut person = repo
            .create(fields("ann@example.com", "Ann", "Lee"))
            .await
            .unwrap();

        person.overwrite(fields("anne@example.org", "Anne", "Li"));
        repo.save(&person).await.unwrap();

        assert_eq!(repo.find(person.id).await.unwrap(), Some(person));
    }
}
