//! Domain crate for future-you: profile model, prompt builder, persistence
//! boundaries, identity and auth gate, route guard and the workflow state
//! machine that ties them together.

pub mod auth;
pub mod completion;
pub mod config;
pub mod error;
pub mod identity;
pub mod io;
pub mod messages;
pub mod paths;
pub mod profile;
pub mod prompt;
pub mod reflection;
pub mod route;
pub mod store;
pub mod types;
pub mod workflow;

pub use error::{FutureYouError, Result};
