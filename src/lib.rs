pub mod cli;
pub mod commands;
pub mod error;
pub mod port;
pub mod process;
pub mod system;
pub mod utils;

pub use error::{Error, Result, ToolError};
