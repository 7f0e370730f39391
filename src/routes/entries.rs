use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
    routing::get,
    Form, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use tower_sessions::Session;

use crate::auth::AuthUser;
use crate::error::{AppError, ServiceError};
use crate::flash::{self, FlashKind};
use crate::models::{split_tags, Entry, EntryInput, Tag};
use crate::routes::Page;
use crate::slug::slugify;
use crate::AppState;

const DUPLICATE_TITLE: &str = "An entry with this title already exists";

#[derive(Template)]
#[template(path = "entries/list.html")]
struct EntryListTemplate {
    page: Page,
    entries: Vec<Entry>,
}

#[derive(Template)]
#[template(path = "entries/detail.html")]
struct EntryDetailTemplate {
    page: Page,
    entry: Entry,
    tags: Vec<Tag>,
}

#[derive(Template)]
#[template(path = "entries/form.html")]
struct EntryFormTemplate {
    page: Page,
    heading: &'static str,
    action: String,
    form: EntryForm,
    errors: HashMap<String, String>,
}

#[derive(Template)]
#[template(path = "entries/delete.html")]
struct DeleteEntryTemplate {
    page: Page,
    entry: Entry,
}

/// Raw entry form fields, kept as strings so invalid input can be shown back.
#[derive(Deserialize, Default, Clone)]
#[serde(default)]
pub struct EntryForm {
    title: String,
    date: String,
    time_spent: String,
    what_i_learned: String,
    resources_to_remember: String,
    tags: String,
}

impl EntryForm {
    fn from_entry(entry: &Entry, tags: &[Tag]) -> Self {
        Self {
            title: entry.title.clone(),
            date: entry.date.format("%Y-%m-%d").to_string(),
            time_spent: entry.time_spent.to_string(),
            what_i_learned: entry.what_i_learned.clone(),
            resources_to_remember: entry.resources_to_remember.clone(),
            tags: tags.iter().map(|t| t.tag.as_str()).collect::<Vec<_>>().join(", "),
        }
    }
}

fn validate_entry_form(form: &EntryForm) -> Result<EntryInput, HashMap<String, String>> {
    let mut errors = HashMap::new();

    let title = form.title.trim();
    if title.is_empty() {
        errors.insert("title".to_string(), "Title is required".to_string());
    } else if slugify(title).is_empty() {
        errors.insert("title".to_string(), "Title must contain at least one letter or number".to_string());
    }

    let date = form.date.trim();
    let parsed_date = if date.is_empty() {
        errors.insert("date".to_string(), "Date is required".to_string());
        None
    } else {
        match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(_) => {
                errors.insert("date".to_string(), "Date must be in YYYY-MM-DD format".to_string());
                None
            }
        }
    };

    let time_spent = form.time_spent.trim();
    let parsed_time = if time_spent.is_empty() {
        errors.insert("time_spent".to_string(), "Time spent is required".to_string());
        None
    } else {
        match time_spent.parse::<i64>() {
            Ok(n) if n >= 0 => Some(n),
            Ok(_) => {
                errors.insert("time_spent".to_string(), "Time spent cannot be negative".to_string());
                None
            }
            Err(_) => {
                errors.insert("time_spent".to_string(), "Time spent must be a whole number of minutes".to_string());
                None
            }
        }
    };

    let what_i_learned = form.what_i_learned.trim();
    if what_i_learned.is_empty() {
        errors.insert("what_i_learned".to_string(), "What I Learned is required".to_string());
    }

    let resources = form.resources_to_remember.trim();
    if resources.is_empty() {
        errors.insert("resources_to_remember".to_string(), "Resources to Remember is required".to_string());
    }

    match (parsed_date, parsed_time) {
        (Some(date), Some(time_spent)) if errors.is_empty() => Ok(EntryInput {
            title: title.to_string(),
            date,
            time_spent,
            what_i_learned: what_i_learned.to_string(),
            resources_to_remember: resources.to_string(),
            tags: split_tags(&form.tags),
        }),
        _ => Err(errors),
    }
}

/// Map a service failure that belongs on the form to a field error.
fn form_error(e: ServiceError) -> Result<HashMap<String, String>, AppError> {
    let mut errors = HashMap::new();
    match e {
        ServiceError::DuplicateSlug(_) => {
            errors.insert("title".to_string(), DUPLICATE_TITLE.to_string());
        }
        ServiceError::Validation { field, message } => {
            errors.insert(field.to_string(), message);
        }
        other => return Err(other.into()),
    }
    Ok(errors)
}

fn parse_id(id: &str) -> Result<i64, AppError> {
    id.parse().map_err(|_| AppError::NotFound)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_entries))
        .route("/new-entry", get(new_entry_form).post(create_entry))
        .route("/entries/{slug}", get(show_entry))
        .route("/entries/edit/{id}", get(edit_entry_form).post(update_entry))
        .route("/entries/delete/{id}", get(confirm_delete))
        .route("/entries/delete/{id}/confirm", get(delete_entry))
}

async fn list_entries(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let entries = state.entries.list_for_user(&user.id).await?;

    let template = EntryListTemplate {
        page: Page::load(&session, Some(user)).await?,
        entries,
    };
    Ok(Html(template.render()?))
}

async fn show_entry(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (entry, tags) = state.entries.detail(&user.id, &slug).await?;

    let template = EntryDetailTemplate {
        page: Page::load(&session, Some(user)).await?,
        entry,
        tags,
    };
    Ok(Html(template.render()?))
}

async fn new_entry_form(session: Session, AuthUser(user): AuthUser) -> Result<impl IntoResponse, AppError> {
    let template = EntryFormTemplate {
        page: Page::load(&session, Some(user)).await?,
        heading: "New Entry",
        action: "/new-entry".to_string(),
        form: EntryForm::default(),
        errors: HashMap::new(),
    };
    Ok(Html(template.render()?))
}

async fn create_entry(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
    Form(form): Form<EntryForm>,
) -> Result<impl IntoResponse, AppError> {
    let errors = match validate_entry_form(&form) {
        Ok(input) => match state.entries.create(&user.id, &input).await {
            Ok(_) => {
                flash::push(&session, FlashKind::Success, "Entry Created! Congrats!").await?;
                return Ok(Redirect::to("/").into_response());
            }
            Err(e) => form_error(e)?,
        },
        Err(errors) => errors,
    };

    let template = EntryFormTemplate {
        page: Page::load(&session, Some(user)).await?,
        heading: "New Entry",
        action: "/new-entry".to_string(),
        form,
        errors,
    };
    Ok(Html(template.render()?).into_response())
}

async fn edit_entry_form(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let entry = state.entries.get(&user.id, id).await?;
    let tags = state.entries.tags_for(&user.id, &entry.slug).await?;

    let template = EntryFormTemplate {
        page: Page::load(&session, Some(user)).await?,
        heading: "Edit Entry",
        action: format!("/entries/edit/{}", entry.id),
        form: EntryForm::from_entry(&entry, &tags),
        errors: HashMap::new(),
    };
    Ok(Html(template.render()?))
}

async fn update_entry(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Form(form): Form<EntryForm>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    // 404 before validation so a missing entry never renders an edit form
    state.entries.get(&user.id, id).await?;

    let errors = match validate_entry_form(&form) {
        Ok(input) => match state.entries.edit(&user.id, id, &input).await {
            Ok(_) => {
                flash::push(&session, FlashKind::Success, "Entry Edited Successfully!").await?;
                return Ok(Redirect::to("/").into_response());
            }
            Err(e) => form_error(e)?,
        },
        Err(errors) => errors,
    };

    let template = EntryFormTemplate {
        page: Page::load(&session, Some(user)).await?,
        heading: "Edit Entry",
        action: format!("/entries/edit/{id}"),
        form,
        errors,
    };
    Ok(Html(template.render()?).into_response())
}

async fn confirm_delete(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state.entries.get(&user.id, parse_id(&id)?).await?;

    let template = DeleteEntryTemplate {
        page: Page::load(&session, Some(user)).await?,
        entry,
    };
    Ok(Html(template.render()?))
}

async fn delete_entry(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.entries.delete(&user.id, parse_id(&id)?).await?;
    flash::push(&session, FlashKind::Success, "You've deleted the entry Successfully!").await?;
    Ok(Redirect::to("/"))
}
