// src/views.rs
//! Rendered views are emitted as the context a template would receive, tagged with
//! the template name.
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::forms::{BoundForm, HypotenuseForm, PersonForm};
use crate::models::{Choice, Person, Question};

pub const INDEX: &str = "polls/index.html";
pub const DETAIL: &str = "polls/detail.html";
pub const RESULTS: &str = "polls/results.html";
pub const TRIANGLE: &str = "polls/triangle.html";
pub const PERSON: &str = "polls/person.html";
pub const PERSON_RES: &str = "polls/person_res.html";

#[derive(Debug, Serialize)]
pub struct View<C> {
    pub template: &'static str,
    #[serde(flatten)]
    pub context: C,
}

impl<C> View<C> {
    pub fn new(template: &'static str, context: C) -> Self {
        Self { template, context }
    }
}

impl<C: Serialize> IntoResponse for View<C> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct Index {
    pub latest_question_list: Vec<Question>,
}

#[derive(Debug, Serialize)]
pub struct Detail {
    pub question: Question,
    pub choices: Vec<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct Results {
    pub question: Question,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Serialize)]
pub struct Triangle {
    pub form: BoundForm<HypotenuseForm>,
    pub gip: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PersonNew {
    pub form: BoundForm<PersonForm>,
    pub person_new: Option<Person>,
}

#[derive(Debug, Serialize)]
pub struct PersonResult {
    pub pn: Option<Person>,
    pub form: BoundForm<PersonForm>,
}
