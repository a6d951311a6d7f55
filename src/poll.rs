// src/poll.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::{Choice, NewQuestion, Question, QuestionWithChoices};

/// Number of questions shown on the poll index.
pub const LATEST_LIMIT: i64 = 5;

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Most recent questions published at or before `now`, newest first.
    async fn latest_published(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Question>, StoreError>;

    /// Looks a question up regardless of its publication date.
    async fn find(&self, id: i64) -> Result<Option<Question>, StoreError>;

    async fn choices(&self, question_id: i64) -> Result<Vec<Choice>, StoreError>;

    /// Adds one vote to `choice_id` if it belongs to `question_id`.
    /// Returns `false` without touching anything otherwise.
    async fn vote(&self, question_id: i64, choice_id: i64) -> Result<bool, StoreError>;

    async fn create(&self, new: NewQuestion) -> Result<QuestionWithChoices, StoreError>;

    async fn find_published(
        &self,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Question>, StoreError> {
        Ok(self.find(id).await?.filter(|q| q.is_published(now)))
    }
}

pub struct PgQuestionRepository {
    pool: PgPool,
}

impl PgQuestionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionRepository for PgQuestionRepository {
    async fn latest_published(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Question>, StoreError> {
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, question_text, pub_date
            FROM questions
            WHERE pub_date <= $1
            ORDER BY pub_date DESC
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn find(&self, id: i64) -> Result<Option<Question>, StoreError> {
        let question = sqlx::query_as::<_, Question>(
            "SELECT id, question_text, pub_date FROM questions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(question)
    }

    async fn choices(&self, question_id: i64) -> Result<Vec<Choice>, StoreError> {
        let choices = sqlx::query_as::<_, Choice>(
            r#"
            SELECT id, question_id, choice_text, votes
            FROM choices
            WHERE question_id = $1
            ORDER BY id
            "#,
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(choices)
    }

    async fn vote(&self, question_id: i64, choice_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE choices
            SET votes = votes + 1
            WHERE id = $1 AND question_id = $2
            "#,
        )
        .bind(choice_id)
        .bind(question_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn create(&self, new: NewQuestion) -> Result<QuestionWithChoices, StoreError> {
        let mut tx = self.pool.begin().await?;

        let question = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (question_text, pub_date)
            VALUES ($1, $2)
            RETURNING id, question_text, pub_date
            "#,
        )
        .bind(&new.question_text)
        .bind(new.pub_date)
        .fetch_one(&mut *tx)
        .await?;

        let mut choices = Vec::with_capacity(new.choices.len());
        for text in &new.choices {
            let choice = sqlx::query_as::<_, Choice>(
                r#"
                INSERT INTO choices (question_id, choice_text, votes)
                VALUES ($1, $2, 0)
                RETURNING id, question_id, choice_text, votes
                "#,
            )
            .bind(question.id)
            .bind(text)
            .fetch_one(&mut *tx)
            .await?;
            choices.push(choice);
        }

        tx.commit().await?;

        Ok(QuestionWithChoices { question, choices })
    }
}
