// src/state.rs
use std::sync::Arc;

use sqlx::PgPool;

use crate::memory::{MemoryPersonRepository, MemoryQuestionRepository};
use crate::people::{PersonRepository, PgPersonRepository};
use crate::poll::{PgQuestionRepository, QuestionRepository};

pub struct AppState {
    pub questions: Arc<dyn QuestionRepository>,
    pub people: Arc<dyn PersonRepository>,
}

impl AppState {
    pub fn postgres(pool: PgPool) -> Arc<Self> {
        Arc::new(Self {
            questions: Arc::new(PgQuestionRepository::new(pool.clone())),
            people: Arc::new(PgPersonRepository::new(pool)),
        })
    }

    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self {
            questions: Arc::new(MemoryQuestionRepository::new()),
            people: Arc::new(MemoryPersonRepository::new()),
        })
    }
}
