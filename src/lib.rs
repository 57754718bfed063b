pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
pub mod input;
pub mod model;
pub mod render;
pub mod source;
mod utils;

pub use config::Config;
pub use error::{CpiError, Error, Result};
