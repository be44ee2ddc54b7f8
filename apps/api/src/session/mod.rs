pub mod handlers;
pub mod store;
pub mod tracker;

pub use store::{ResumeDocument, Session, SessionStore};
