//!
//! Documentation of the config module.
//! Contains the files needed for configuration and logging setup.
//!


pub mod config;
