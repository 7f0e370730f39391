pub mod user;
pub mod entry;
pub mod tag;

pub use user::User;
pub use entry::{Entry, EntryInput};
pub use tag::{split_tags, Tag};
