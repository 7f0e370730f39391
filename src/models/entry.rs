use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entry {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub date: NaiveDate,
    /// Minutes.
    pub time_spent: i64,
    pub what_i_learned: String,
    pub resources_to_remember: String,
    pub slug: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Validated field set for creating or editing an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInput {
    pub title: String,
    pub date: NaiveDate,
    pub time_spent: i64,
    pub what_i_learned: String,
    pub resources_to_remember: String,
    pub tags: Vec<String>,
}

impl Entry {
    pub fn time_spent_label(&self) -> String {
        match self.time_spent {
            1 => "1 minute".to_string(),
            n => format!("{n} minutes"),
        }
    }
}
