//! Cross-platform utilities
//!
//! - [`fs`]: atomic file writes, staged directory replacement, tree reads
//! - [`platform`]: home directory, path expansion, storage path normalization
//! - [`path_validation`]: traversal checks for manifest paths and write destinations

pub mod fs;
pub mod path_validation;
pub mod platform;

pub use fs::{atomic_write, ensure_dir};
pub use path_validation::{ensure_within, validate_no_traversal};
pub use platform::{get_home_dir, normalize_path_for_storage, resolve_path};
