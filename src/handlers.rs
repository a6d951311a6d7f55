// handlers.rs
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        Path, State,
    },
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::Utc;
use http::StatusCode;
use tracing::{debug, info};

use crate::error::{AppError, StoreError};
use crate::forms::{BoundForm, FormErrors, HypotenuseForm, PersonForm, DUPLICATE_EMAIL, MAX_LENGTH};
use crate::models::{NewQuestion, NewQuestionRequest, Person, Question, VoteRequest};
use crate::poll::LATEST_LIMIT;
use crate::state::AppState;
use crate::views::{self, Detail, Index, PersonNew, PersonResult, Results, Triangle, View};

const NO_CHOICE: &str = "You didn't select a choice.";

fn no_question() -> AppError {
    AppError::not_found("No Question matches the given query.")
}

fn no_person() -> AppError {
    AppError::not_found("No Person matches the given query.")
}

/// Identifiers that are not integers cannot name a record.
fn question_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id).map_err(|_| no_question())
}

fn person_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id).map_err(|_| no_person())
}

/// Last five published questions, newest first.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<View<Index>, AppError> {
    let latest_question_list = state
        .questions
        .latest_published(Utc::now(), LATEST_LIMIT)
        .await?;

    Ok(View::new(views::INDEX, Index { latest_question_list }))
}

async fn published_question(state: &AppState, question_id: i64) -> Result<Question, AppError> {
    state
        .questions
        .find_published(question_id, Utc::now())
        .await?
        .ok_or_else(no_question)
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<View<Detail>, AppError> {
    let question = published_question(&state, question_id(path)?).await?;
    let choices = state.questions.choices(question.id).await?;

    Ok(View::new(
        views::DETAIL,
        Detail {
            question,
            choices,
            error_message: None,
        },
    ))
}

pub async fn results(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<View<Results>, AppError> {
    let question = published_question(&state, question_id(path)?).await?;
    let choices = state.questions.choices(question.id).await?;

    Ok(View::new(views::RESULTS, Results { question, choices }))
}

/// Records one vote, then answers `303 See Other` to the results so a refresh cannot
/// vote twice. An absent or foreign choice re-renders the detail view instead.
pub async fn vote(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    form: Result<Form<VoteRequest>, FormRejection>,
) -> Result<Response, AppError> {
    let question = state
        .questions
        .find(question_id(path)?)
        .await?
        .ok_or_else(no_question)?;

    let choice_id = form
        .ok()
        .and_then(|Form(req)| req.choice)
        .and_then(|raw| raw.trim().parse::<i64>().ok());

    let voted = match choice_id {
        Some(choice_id) => state.questions.vote(question.id, choice_id).await?,
        None => false,
    };

    if !voted {
        debug!("Rejected vote on question {}: no valid choice", question.id);
        let choices = state.questions.choices(question.id).await?;
        return Ok(View::new(
            views::DETAIL,
            Detail {
                question,
                choices,
                error_message: Some(NO_CHOICE),
            },
        )
        .into_response());
    }

    info!("Vote recorded on question {}", question.id);
    Ok(Redirect::to(&format!("/polls/{}/results/", question.id)).into_response())
}

pub async fn triangle_form() -> View<Triangle> {
    View::new(
        views::TRIANGLE,
        Triangle {
            form: BoundForm::empty(),
            gip: None,
        },
    )
}

/// Non-positive legs are a 404, not a form error; other bad input re-renders the form.
pub async fn submit_triangle(
    Form(form): Form<HypotenuseForm>,
) -> Result<View<Triangle>, AppError> {
    let (gip, errors) = match form.validate() {
        Ok(legs) => match legs.hypotenuse() {
            Some(gip) => (Some(gip), FormErrors::default()),
            None => {
                debug!("Rejected legs {} and {}", legs.first, legs.second);
                return Err(AppError::not_found("Incorrect data"));
            }
        },
        Err(errors) => (None, errors),
    };

    Ok(View::new(
        views::TRIANGLE,
        Triangle {
            form: BoundForm::new(form, errors),
            gip,
        },
    ))
}

pub async fn person_form() -> View<PersonNew> {
    View::new(
        views::PERSON,
        PersonNew {
            form: BoundForm::empty(),
            person_new: None,
        },
    )
}

pub async fn create_person(
    State(state): State<Arc<AppState>>,
    Form(form): Form<PersonForm>,
) -> Result<Response, AppError> {
    let errors = match form.validate() {
        Ok(fields) => match state.people.create(fields).await {
            Ok(person) => {
                info!("Created person {}", person.id);
                let location = format!("/polls/person/{}/", person.id);
                return Ok(Redirect::to(&location).into_response());
            }
            Err(StoreError::DuplicateEmail) => duplicate_email(),
            Err(e) => return Err(e.into()),
        },
        Err(errors) => errors,
    };

    Ok(View::new(
        views::PERSON,
        PersonNew {
            form: BoundForm::new(form, errors),
            person_new: None,
        },
    )
    .into_response())
}

pub async fn person_detail(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<View<PersonResult>, AppError> {
    let person = state.people.find(person_id(path)?).await?.ok_or_else(no_person)?;

    Ok(View::new(
        views::PERSON_RES,
        PersonResult {
            form: BoundForm::new(PersonForm::from(&person), FormErrors::default()),
            pn: Some(person),
        },
    ))
}

/// Overwrites every field of an existing person with the submitted values.
pub async fn update_person(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    Form(form): Form<PersonForm>,
) -> Result<View<PersonResult>, AppError> {
    let id = person_id(path)?;
    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(errors) => return Ok(person_result(None, form, errors)),
    };

    let mut person = state.people.find(id).await?.ok_or_else(no_person)?;
    person.overwrite(fields);

    match state.people.save(&person).await {
        Ok(()) => {
            info!("Updated person {}", person.id);
            Ok(person_result(Some(person), form, FormErrors::default()))
        }
        Err(StoreError::DuplicateEmail) => Ok(person_result(None, form, duplicate_email())),
        Err(e) => Err(e.into()),
    }
}

fn person_result(
    pn: Option<Person>,
    form: PersonForm,
    errors: FormErrors,
) -> View<PersonResult> {
    View::new(
        views::PERSON_RES,
        PersonResult {
            pn,
            form: BoundForm::new(form, errors),
        },
    )
}

fn duplicate_email() -> FormErrors {
    let mut errors = FormErrors::default();
    errors.add("email", DUPLICATE_EMAIL);
    errors
}

/// Creates a question with its choices (admin only)
pub async fn create_question(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewQuestionRequest>,
) -> Result<Response, AppError> {
    let question_text = payload.question_text.trim().to_string();
    if question_text.is_empty() || question_text.chars().count() > MAX_LENGTH {
        return Err(AppError::MalformedPayload("question_text".into()));
    }

    let mut choices = Vec::with_capacity(payload.choices.len());
    for choice in &payload.choices {
        let choice = choice.trim();
        if choice.is_empty() || choice.chars().count() > MAX_LENGTH {
            return Err(AppError::MalformedPayload("choices".into()));
        }
        choices.push(choice.to_string());
    }

    let created = state
        .questions
        .create(NewQuestion {
            question_text,
            pub_date: payload.pub_date.unwrap_or_else(Utc::now),
            choices,
        })
        .await?;

    info!(
        "Created question {} with {} choices",
        created.question.id,
        created.choices.len()
    );
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

pub async fn health() -> &'static str {
    "ok"
}
