pub mod content_model;

pub use content_model::*;
