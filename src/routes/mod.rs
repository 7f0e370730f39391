pub mod auth;
pub mod entries;

use askama::Template;
use axum::response::Response;
use tower_sessions::Session;

use crate::error::{not_found_page, AppError};
use crate::flash::{self, Flash};
use crate::models::User;

/// Layout data shared by every page: the signed-in user and pending flashes.
pub struct Page {
    pub user: Option<User>,
    pub flashes: Vec<Flash>,
    pub static_hash: &'static str,
}

impl Page {
    pub async fn load(session: &Session, user: Option<User>) -> Result<Self, AppError> {
        Ok(Self {
            user,
            flashes: flash::take(session).await?,
            static_hash: crate::STATIC_HASH,
        })
    }

    pub fn anonymous() -> Self {
        Self {
            user: None,
            flashes: Vec::new(),
            static_hash: crate::STATIC_HASH,
        }
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    page: Page,
}

impl NotFoundTemplate {
    pub fn anonymous() -> Self {
        Self { page: Page::anonymous() }
    }
}

pub async fn not_found() -> Response {
    not_found_page()
}
