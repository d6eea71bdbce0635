//! HTTP surface of the SmartCart recommender

pub mod rest;

pub use rest::{AppState, RestApi};
