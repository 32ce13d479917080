//!
//! Documentation of the ODM module.
//! Contains all the files needed for a MongoDB database connections.
//!


use super::config;
pub mod odm;
pub mod models;
pub mod odm_utils;
pub mod ledger;
