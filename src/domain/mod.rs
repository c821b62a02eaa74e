// Domain layer - models and error types

pub mod errors;
pub mod model;
