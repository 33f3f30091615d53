//! gitty library
//!
//! This module exports the command-line front end of gitty for use in
//! integration tests and as a library.

pub mod app;
pub mod config;
pub mod render;
