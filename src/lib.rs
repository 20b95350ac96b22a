//! Read-only blog core: aggregation, selection and page assembly over a
//! Postgres-backed store, served by axum and rendered with askama.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
