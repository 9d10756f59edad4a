//! Integration test suite for cuco
//!
//! End-to-end scenarios that drive the `cuco` binary against throwaway
//! projects, registries and `file://` git sources.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **commands**: `init`, `source`, `bundle` and argument handling
//! - **install**: fresh installs, idempotence, partial failure and unknown sources
//! - **sync**: upstream updates, local edits, conflicts and `status`
//! - **sources**: git sources, offline fallback, concurrency and `remove`

mod common;

mod commands;
mod install;
mod sources;
mod sync;
