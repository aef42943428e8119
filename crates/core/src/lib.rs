//! Cafe Finder Core - Shared types library.
//!
//! This crate provides the types shared by the Cafe Finder components:
//! - `server` - Accounts, sessions, access control and the cafe registry
//! - `cli` - Database migrations
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, roles, canonical cafe names and ratings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
