use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use tower_sessions::Session;

use crate::auth::{login_user, logout_user, AuthUser};
use crate::error::{AppError, ServiceError};
use crate::flash::{self, FlashKind};
use crate::routes::Page;
use crate::AppState;

const BAD_CREDENTIALS: &str = "Your email or password doesn't match!";

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    page: Page,
    email: String,
    errors: HashMap<String, String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginForm {
    email: String,
    password: String,
}

fn validate_login_form(form: &LoginForm) -> HashMap<String, String> {
    let mut errors = HashMap::new();

    let email = form.email.trim();
    if email.is_empty() {
        errors.insert("email".to_string(), "Email is required".to_string());
    } else if !looks_like_email(email) {
        errors.insert("email".to_string(), "Enter a valid email address".to_string());
    }

    if form.password.is_empty() {
        errors.insert("password".to_string(), "Password is required".to_string());
    }

    errors
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout))
}

async fn login_page(session: Session) -> Result<impl IntoResponse, AppError> {
    let template = LoginTemplate {
        page: Page::load(&session, None).await?,
        email: String::new(),
        errors: HashMap::new(),
    };
    Ok(Html(template.render()?))
}

async fn login_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let mut errors = validate_login_form(&form);

    if errors.is_empty() {
        match state.credentials.authenticate(&form.email, &form.password).await {
            Ok(user) => {
                login_user(&session, &user).await?;
                flash::push(&session, FlashKind::Success, "You've been logged in!").await?;
                tracing::info!(user_id = %user.id, "user logged in");
                return Ok(Redirect::to("/").into_response());
            }
            Err(ServiceError::AuthenticationFailure) => {
                errors.insert("form".to_string(), BAD_CREDENTIALS.to_string());
            }
            Err(e) => return Err(e.into()),
        }
    }

    let template = LoginTemplate {
        page: Page::load(&session, None).await?,
        email: form.email,
        errors,
    };
    Ok(Html(template.render()?).into_response())
}

async fn logout(session: Session, AuthUser(user): AuthUser) -> Result<impl IntoResponse, AppError> {
    logout_user(&session).await?;
    // lands in a fresh session, the old one is gone
    flash::push(&session, FlashKind::Success, "You've been logged out! Come back soon!").await?;
    tracing::info!(user_id = %user.id, "user logged out");
    Ok(Redirect::to("/login"))
}
