// models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
}

impl Question {
    /// A question is visible once its publication date has passed.
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        self.pub_date <= now
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub choice_text: String,
    pub votes: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Person {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Validated person fields, ready to insert or to overwrite an existing record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonFields {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Person {
    pub fn overwrite(&mut self, fields: PersonFields) {
        self.email = fields.email;
        self.first_name = fields.first_name;
        self.last_name = fields.last_name;
    }
}

/// Question to be created with its answer options.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
    pub choices: Vec<String>,
}

#[derive(Deserialize)]
pub struct NewQuestionRequest {
    pub question_text: String,
    pub pub_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub choices: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct QuestionWithChoices {
    #[serde(flatten)]
    pub question: Question,
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct VoteRequest {
    pub choice: Option<String>,
}
