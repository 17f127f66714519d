//! CipherSQL sandbox binary library
//!
//! This library exposes the binary's modules for integration testing.

pub mod cli;
pub mod commands;
pub mod lifecycle;
pub mod logging;
