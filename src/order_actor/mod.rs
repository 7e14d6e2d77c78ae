//! Orders: immutable checkout snapshots whose only moving part is the status.

mod actions;
pub mod entity;
pub mod error;
mod repository;

pub use actions::*;
pub use error::*;
pub use repository::OrderRepository;
