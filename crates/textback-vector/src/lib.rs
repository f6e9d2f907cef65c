//! textback-vector
//!
//! LanceDB-backed persistent similarity index. See `collection` for the
//! `VectorIndex` implementation and `table` for connection helpers.
pub mod collection;
pub mod schema;
pub mod table;

pub use collection::LanceCollection;
