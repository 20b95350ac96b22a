//! Application services: aggregation, selection and page assembly.

pub mod aggregation;
pub mod error;
pub mod pages;
pub mod repos;
pub mod selection;
