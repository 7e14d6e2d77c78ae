//! Product catalog: lifecycle hooks and the SQLite table behind the product actor.

pub mod entity;
pub mod error;
mod repository;

pub use error::*;
pub use repository::ProductRepository;
