//! Real-estate listings: properties, offers, and the catalog around them,
//! stored in SQLite and served over a JSON API.

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod offer;
pub mod partner;
pub mod property;
pub mod rules;
pub mod schema;

pub use error::{EstateError, EstateResult};
