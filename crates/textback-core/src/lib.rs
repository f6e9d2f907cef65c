//! Shared building blocks: domain types, the error taxonomy, capability
//! traits, configuration, and the corpus loader.
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod corpus;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
