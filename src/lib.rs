pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod output;
pub mod pipeline;
pub mod storage;
pub mod translation;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{Pipeline, RunOptions, RunOutput};
