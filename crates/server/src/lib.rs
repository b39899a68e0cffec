//! HTTP front end for the streamrank ranking engine.

pub mod api;
pub mod metrics;
pub mod state;
