//! Core types shared by every cuco module
//!
//! # Modules
//!
//! - `error`: [`CucoError`], the strongly-typed error enum, plus [`ErrorContext`] and
//!   [`user_friendly_error`] for rendering failures at the CLI boundary.
//! - `resource`: [`ResourceType`], the four kinds of customization a bundle can declare.

pub mod error;
pub mod resource;

pub use error::{CucoError, ErrorCategory, ErrorContext, user_friendly_error};
pub use resource::ResourceType;
