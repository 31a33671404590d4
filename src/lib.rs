pub mod app;
pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod feed;
pub mod ui;
pub mod util;

pub use error::{PanelError, Result};
