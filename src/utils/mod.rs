// Utilities

pub mod logging;
