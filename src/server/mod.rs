//! HTTP surface: a single retrieval endpoint plus collection introspection.

pub mod handlers;
pub mod routing;
pub mod startup;
pub mod types;
