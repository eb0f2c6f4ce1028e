// src/lib.rs

//! Profile Timeline Analyzer Library

pub mod driver;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;

#[cfg(feature = "server")]
pub mod server;

#[cfg(test)]
mod testing;
