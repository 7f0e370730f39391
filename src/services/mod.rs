pub mod credentials;
pub mod entries;

pub use credentials::CredentialStore;
pub use entries::EntryService;
