// src/memory.rs
//! Process-local repositories, used when no `DATABASE_URL` is configured.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::{Choice, NewQuestion, Person, PersonFields, Question, QuestionWithChoices};
use crate::people::PersonRepository;
use crate::poll::QuestionRepository;

#[derive(Default)]
struct Polls {
    questions: Vec<Question>,
    choices: Vec<Choice>,
    next_question_id: i64,
    next_choice_id: i64,
}

#[derive(Default)]
pub struct MemoryQuestionRepository {
    inner: RwLock<Polls>,
}

impl MemoryQuestionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionRepository for MemoryQuestionRepository {
    async fn latest_published(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Question>, StoreError> {
        let polls = self.inner.read().await;
        let mut published: Vec<Question> = polls
            .questions
            .iter()
            .filter(|q| q.is_published(now))
            .cloned()
            .collect();
        published.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
        published.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(published)
    }

    async fn find(&self, id: i64) -> Result<Option<Question>, StoreError> {
        let polls = self.inner.read().await;
        Ok(polls.questions.iter().find(|q| q.id == id).cloned())
    }

    async fn choices(&self, question_id: i64) -> Result<Vec<Choice>, StoreError> {
        let polls = self.inner.read().await;
        Ok(polls
            .choices
            .iter()
            .filter(|c| c.question_id == question_id)
            .cloned()
            .collect())
    }

    async fn vote(&self, question_id: i64, choice_id: i64) -> Result<bool, StoreError> {
        let mut polls = self.inner.write().await;
        match polls
            .choices
            .iter_mut()
            .find(|c| c.id == choice_id && c.question_id == question_id)
        {
            Some(choice) => {
                choice.votes = choice
                    .votes
                    .checked_add(1)
                    .ok_or(StoreError::VoteOverflow(choice.id))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create(&self, new: NewQuestion) -> Result<QuestionWithChoices, StoreError> {
        let mut polls = self.inner.write().await;

        polls.next_question_id += 1;
        let question = Question {
            id: polls.next_question_id,
            question_text: new.question_text,
            pub_date: new.pub_date,
        };
        polls.questions.push(question.clone());

        let mut choices = Vec::with_capacity(new.choices.len());
        for choice_text in new.choices {
            polls.next_choice_id += 1;
            let choice = Choice {
                id: polls.next_choice_id,
                question_id: question.id,
                choice_text,
                votes: 0,
            };
            polls.choices.push(choice.clone());
            choices.push(choice);
        }

        Ok(QuestionWithChoices { question, choices })
    }
}

#[derive(Default)]
struct People {
    rows: Vec<Person>,
    next_id: i64,
}

#[derive(Default)]
pub struct MemoryPersonRepository {
    inner: RwLock<People>,
}

impl MemoryPersonRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersonRepository for MemoryPersonRepository {
    async fn find(&self, id: i64) -> Result<Option<Person>, StoreError> {
        let people = self.inner.read().await;
        Ok(people.rows.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, fields: PersonFields) -> Result<Person, StoreError> {
        let mut people = self.inner.write().await;
        if people.rows.iter().any(|p| p.email == fields.email) {
            return Err(StoreError::DuplicateEmail);
        }

        people.next_id += 1;
        let person = Person {
            id: people.next_id,
            email: fields.email,
            first_name: fields.first_name,
            last_name: fields.last_name,
        };
        people.rows.push(person.clone());
        Ok(person)
    }

    async fn save(&self, person: &Person) -> Result<(), StoreError> {
        let mut people = self.inner.write().await;
        if people
            .rows
            .iter()
            .any(|p| p.id != person.id && p.email == person.email)
        {
            return Err(StoreError::DuplicateEmail);
        }

        if let Some(row) = people.rows.iter_mut().find(|p| p.id == person.id) {
            *row = person.clone();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_question(text: &str, pub_date: DateTime<Utc>, choices: &[&str]) -> NewQuestion {
        NewQuestion {
            question_text: text.to_string(),
            pub_date,
            choices: choices.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn fields(email: &str, first: &str, last: &str) -> PersonFields {
        PersonFields {
            email: email.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
        }
    }

    #[tokio::test]
    async fn latest_published_skips_future_and_caps_at_limit() {
        let repo = MemoryQuestionRepository::new();
        let now = Utc::now();
        for days in 1..=7 {
            repo.create(new_question(&format!("past {days}"), now - Duration::days(days), &[]))
                .await
                .unwrap();
        }
        repo.create(new_question("future", now + Duration::days(1), &[]))
            .await
            .unwrap();

        let latest = repo.latest_published(now, 5).await.unwrap();
        let texts: Vec<&str> = latest.iter().map(|q| q.question_text.as_str()).collect();
        assert_eq!(texts, ["past 1", "past 2", "past 3", "past 4", "past 5"]);
    }

    #[tokio::test]
    async fn find_published_hides_future_questions() {
        let repo = MemoryQuestionRepository::new();
        let now = Utc::now();
        let future = repo
            .create(new_question("future", now + Duration::hours(1), &[]))
            .await
            .unwrap();

        assert!(repo.find(future.question.id).await.unwrap().is_some());
        assert!(repo
            .find_published(future.question.id, now)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn vote_touches_only_the_chosen_choice() {
        let repo = MemoryQuestionRepository::new();
        let created = repo
            .create(new_question("q", Utc::now(), &["a", "b", "c"]))
            .await
            .unwrap();
        let qid = created.question.id;
        let target = created.choices[1].id;

        assert!(repo.vote(qid, target).await.unwrap());

        let votes: Vec<i32> = repo
            .choices(qid)
            .await
            .unwrap()
            .iter()
            .map(|c| c.votes)
            .collect();
        assert_eq!(votes, [0, 1, 0]);
    }

    #[tokio::test]
    async fn vote_at_max_count_errors_without_changing_it() {
        let repo = MemoryQuestionRepository::new();
        let created = repo
            .create(new_question("q", Utc::now(), &["a"]))
            .await
            .unwrap();
        let choice_id = created.choices[0].id;
        repo.inner.write().await.choices[0].votes = i32::MAX;

        let err = repo.vote(created.question.id, choice_id).await.unwrap_err();
        assert!(matches!(err, StoreError::VoteOverflow(id) if id == choice_id));
        assert_eq!(repo.choices(created.question.id).await.unwrap()[0].votes, i32::MAX);
    }

    #[tokio::test]
    async fn vote_rejects_choice_of_other_question() {
        let repo = MemoryQuestionRepository::new();
        let first = repo
            .create(new_question("first", Utc::now(), &["a"]))
            .await
            .unwrap();
        let second = repo
            .create(new_question("second", Utc::now(), &["b"]))
            .await
            .unwrap();

        let foreign = second.choices[0].id;
        assert!(!repo.vote(first.question.id, foreign).await.unwrap());
        assert_eq!(repo.choices(second.question.id).await.unwrap()[0].votes, 0);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = MemoryPersonRepository::new();
        repo.create(fields("ann@example.com", "Ann", "Lee"))
            .await
            .unwrap();

        let err = repo
            .create(fields("ann@example.com", "Other", "Person"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn save_overwrites_fields_and_keeps_own_email() {
        let repo = MemoryPersonRepository::new();
        let mut person = repo
            .create(fields("ann@example.com", "Ann", "Lee"))
            .await
            .unwrap();

        person.overwrite(fields("ann@example.com", "Anne", "Li"));
        repo.save(&person).await.unwrap();

        assert_eq!(repo.find(person.id).await.unwrap(), Some(person));
    }

    #[tokio::test]
    async fn save_rejects_email_of_another_person() {
        let repo = MemoryPersonRepository::new();
        repo.create(fields("ann@example.com", "Ann", "Lee"))
            .await
            .unwrap();
        let mut bob = repo
            .create(fields("bob@example.com", "Bob", "Ray"))
            .await
            .unwrap();

        bob.email = "ann@example.com".to_string();
        let err = repo.save(&bob).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }
}
