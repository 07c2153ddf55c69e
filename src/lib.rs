pub mod app;
pub mod backend;
pub mod config;
pub mod domain;
pub mod error;
pub mod event;
pub mod handler;
pub mod logging;
pub mod tui;
pub mod ui;

pub use backend::iwconfig::{Iwconfig, ToolPaths};
pub use error::IwError;
