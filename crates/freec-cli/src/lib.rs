//! CLI support for the freec compiler.
//!
//! This crate provides the `freec` binary and its modules: argument
//! parsing, the compilation driver, and tracing setup.

pub mod args;
pub mod driver;
pub mod trace;

#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod driver_tests;
