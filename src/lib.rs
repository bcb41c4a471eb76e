pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod utils;
pub mod writers;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{MapError, Result};
