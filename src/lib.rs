//! This crate provides a crude assay server. It serves reference data from a crude assay
//! database and blends the assays of several crudes by volume, producing the yields, API gravity,
//! sulphur content and conversion factor of the resulting mix.
//!
//! A blend request names crude IDs and a volume (or ratio) for each. Duplicate crude IDs are
//! merged, the recommended assay of each crude is pivoted into a yield matrix with one column per
//! distillation cut, and a volume-weighted average is taken. A blend either succeeds for every
//! requested crude or fails as a whole.
//!
//! The server is built on top of a number of open source components.
//!
//! * [Tokio](tokio), the most popular asynchronous Rust runtime.
//! * [Axum](axum) web framework, built by the Tokio team, on top of the [hyper] HTTP library.
//! * [Serde](serde) performs (de)serialisation of query strings and JSON responses.
//! * [SQLx](sqlx) provides pooled, parameterised access to the PostgreSQL assay database.
//! * [ndarray] provides the arrays used in the blending computation.

pub mod app;
pub mod app_state;
pub mod blend;
pub mod cli;
pub mod conversion;
pub mod error;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod server;
pub mod store;
#[cfg(test)]
pub mod test_utils;
pub mod tracing;
pub mod validated_query;
pub mod yields;
