//! One-shot notices carried in the session until the next rendered page.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

const FLASH_KEY: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

impl std::fmt::Display for FlashKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlashKind::Success => write!(f, "success"),
            FlashKind::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

pub async fn push(session: &Session, kind: FlashKind, message: impl Into<String>) -> Result<(), tower_sessions::session::Error> {
    let mut flashes: Vec<Flash> = session.get(FLASH_KEY).await?.unwrap_or_default();
    flashes.push(Flash {
        kind,
        message: message.into(),
    });
    session.insert(FLASH_KEY, flashes).await
}

pub async fn take(session: &Session) -> Result<Vec<Flash>, tower_sessions::session::Error> {
    let flashes: Option<Vec<Flash>> = session.remove(FLASH_KEY).await?;
    Ok(flashes.unwrap_or_default())
}
