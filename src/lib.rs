pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod service;
pub mod workspace;

pub use error::{PyletError, Result};
