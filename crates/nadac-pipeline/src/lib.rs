//! # nadac-pipeline
//!
//! Batch job that joins the NADAC price file with RxNorm and writes one JSON
//! record per concept plus the front-end search indexes.
//!
//! The work is done by [`nadac_loader::run`]; this crate only reads settings
//! from the environment and sets up logging.

#![warn(missing_docs)]

pub mod config;

pub use config::from_env;
