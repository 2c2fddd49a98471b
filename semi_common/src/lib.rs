//! Semi Common Library
//!
//! This crate provides the port registry, shared types, collaborator traits
//! and configuration loading for all Semi workspace crates.
//!
//! # Module Structure
//!
//! - [`registry`] - One-instance-per-port resource registry
//! - [`port`] - Port identifiers, validation and configured limits
//! - [`device`] - Hardware buses and driver-layer error types
//! - [`collab`] - Interfaces of externally owned collaborators
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - System-wide constants
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use semi_common::prelude::*;
//! ```

pub mod collab;
pub mod config;
pub mod consts;
pub mod device;
pub mod port;
pub mod prelude;
pub mod registry;
