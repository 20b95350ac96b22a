//! Presentation layer: serialized records and template views.

pub mod serializers;
pub mod views;
