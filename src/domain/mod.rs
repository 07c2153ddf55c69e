pub mod common;
pub mod settings;
pub mod wireless;
