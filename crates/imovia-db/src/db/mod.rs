//! Database repositories for the data access layer
//!
//! Each repository owns the queries for one table. The capability traits in
//! `traits` decouple the services from Postgres.

pub mod media;
pub mod property;
pub mod traits;
