//! Pure game rules: coordinates, distance, scoring and the location catalog.

pub mod catalog;
pub mod geo;
pub mod score;
pub mod types;
