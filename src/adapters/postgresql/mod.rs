//! PostgreSQL integration
//!
//! Both the operational store and the warehouse are PostgreSQL databases.
//! [`PostgresClient`] owns a connection pool; [`PostgresSource`] and
//! [`PostgresWarehouse`] implement the store traits on top of it.

pub mod client;
pub mod models;
pub mod source;
pub mod warehouse;

pub use client::{PostgresClient, StoreRole};
pub use source::PostgresSource;
pub use warehouse::PostgresWarehouse;
