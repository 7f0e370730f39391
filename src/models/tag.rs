use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user's label on an entry. `post_url` holds the entry slug; there is no
/// foreign key between the two tables.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub user_id: String,
    pub tag: String,
    pub post_url: String,
}

/// Split a comma separated tag string. All whitespace is removed from each
/// token and empty tokens are dropped; order and duplicates are kept.
pub fn split_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|token| token.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|token| !token.is_empty())
        .collect()
}
