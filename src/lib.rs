// Crate root library declaration and module exports.
pub mod cli;
pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod extract;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod publish;
pub mod reconcile;
pub mod store;

pub use error::{PresaleError, Result};
