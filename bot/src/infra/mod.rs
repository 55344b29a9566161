//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: cloud provider calls,
//! TCP probing, and configuration loading.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands`, `crate::server` or `crate::output` are
//! forbidden.

#[cfg(feature = "aws")]
pub mod aws;
pub mod config;
pub mod network;
pub mod shell;
