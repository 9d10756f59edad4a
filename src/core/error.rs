//! Error handling for cuco
//!
//! This module provides the strongly-typed error enum used across the crate and the
//! user-facing wrapper that adds details and suggestions when an error reaches the CLI.
//!
//! # Error Categories
//!
//! - **Configuration**: [`CucoError::SourceNotFound`], [`CucoError::ManifestParseError`],
//!   [`CucoError::BundleNotFound`], ... These are fatal and surface immediately.
//! - **Resolution**: [`CucoError::ResourceFileNotFound`], [`CucoError::SourceLayoutInvalid`].
//!   Fatal for the bundle operation that hit them.
//! - **Availability**: [`CucoError::SourceUnavailable`], [`CucoError::GitCloneFailed`].
//!   Fatal only when no cached copy exists.
//! - **Materialization**: [`CucoError::MaterializeFailed`], [`CucoError::PathEscapesTarget`].
//!
//! Library code returns [`anyhow::Result`] and raises typed errors with
//! `CucoError::X { .. }.into()`, so callers can recover the variant with
//! [`anyhow::Error::downcast_ref`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use cuco_cli::core::{CucoError, ErrorContext};
//!
//! let context = ErrorContext::new(CucoError::SourceNotFound {
//!     name: "acme".to_string(),
//! })
//! .with_suggestion("Register it with 'cuco source add acme <url>'");
//!
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for cuco operations.
#[derive(Error, Debug)]
pub enum CucoError {
    /// Git operation failed during execution
    ///
    /// # Fields
    /// - `operation`: The git operation that failed (e.g., "clone", "pull")
    /// - `stderr`: The error output from the git command
    #[error("Git operation failed: {operation}")]
    GitCommandError {
        /// The git operation that failed
        operation: String,
        /// The error output from the git command
        stderr: String,
    },

    /// Git executable not found in PATH
    #[error("Git is not installed or not found in PATH")]
    GitNotFound,

    /// Git repository clone failed
    #[error("Failed to clone repository: {url}")]
    GitCloneFailed {
        /// The repository URL that failed to clone
        url: String,
        /// The reason for the clone failure
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Named source is not registered in either scope
    #[error("Unknown source '{name}': not registered in project or global configuration")]
    SourceNotFound {
        /// Name of the source that could not be found
        name: String,
    },

    /// Named source already registered in the same scope with another URL
    #[error("Source '{name}' already exists in {scope} scope with URL {existing_url}")]
    SourceAlreadyExists {
        /// Name of the source
        name: String,
        /// Scope the conflicting entry lives in
        scope: String,
        /// URL currently registered under the name
        existing_url: String,
    },

    /// Source could not be fetched and no cached copy exists
    #[error("Source '{name}' is unavailable: {url}")]
    SourceUnavailable {
        /// Name of the source
        name: String,
        /// URL that could not be fetched
        url: String,
        /// Underlying failure
        reason: String,
    },

    /// Source was fetched but does not follow the expected layout
    #[error("Source '{name}' exists but has the wrong layout: missing '{marker}' directory")]
    SourceLayoutInvalid {
        /// Name of the source
        name: String,
        /// Marker directory that was expected at the repository root
        marker: String,
    },

    /// Bundle manifest could not be found
    #[error("Bundle '{name}' not found")]
    BundleNotFound {
        /// Bundle name or path that was requested
        name: String,
        /// Closest known bundle names
        suggestions: Vec<String>,
    },

    /// Manifest parsing error
    #[error("Invalid bundle manifest syntax in {file}")]
    ManifestParseError {
        /// Path to the manifest file that failed to parse
        file: String,
        /// Specific reason for the parsing failure
        reason: String,
    },

    /// Manifest validation error
    #[error("Bundle manifest validation failed: {reason}")]
    ManifestValidationError {
        /// Reason why manifest validation failed
        reason: String,
    },

    /// Materialized record parsing error
    #[error("Invalid install record in {file}")]
    RecordParseError {
        /// Path to the record file
        file: String,
        /// Specific reason for the parsing failure
        reason: String,
    },

    /// Dependency entry could not be resolved
    #[error("Cannot resolve {resource_type} '{name}': {reason}")]
    InvalidDependency {
        /// Resource type of the failed entry
        resource_type: String,
        /// Name of the failed entry
        name: String,
        /// Reason the entry could not be resolved
        reason: String,
    },

    /// Resource file not found in its source
    #[error("Resource path '{path}' not found in {source_name}")]
    ResourceFileNotFound {
        /// Path to the resource within its source
        path: String,
        /// Human readable name of the source
        source_name: String,
    },

    /// Single resource not present in the registry
    #[error("No {resource_type} named '{name}' in the registry")]
    RegistryItemNotFound {
        /// Resource type that was searched
        resource_type: String,
        /// Requested name
        name: String,
        /// Names the registry does hold for that type
        available: Vec<String>,
    },

    /// Invalid resource type
    #[error("Invalid resource type: {resource_type}")]
    InvalidResourceType {
        /// The invalid resource type that was specified
        resource_type: String,
    },

    /// Unknown target engine
    #[error("Unknown target engine: {engine}")]
    UnknownEngine {
        /// The engine name that was given
        engine: String,
    },

    /// Destination would be written outside the target tree
    #[error("Refusing to write outside the target directory: {path}")]
    PathEscapesTarget {
        /// Offending destination path
        path: String,
    },

    /// Writing a resource into the target failed
    #[error("Failed to materialize '{name}' at {path}: {reason}")]
    MaterializeFailed {
        /// Resource name
        name: String,
        /// Destination path
        path: String,
        /// Underlying failure
        reason: String,
    },

    /// Bundle has no install record
    #[error("Bundle '{name}' is not installed in {target}")]
    BundleNotInstalled {
        /// Bundle name
        name: String,
        /// Target root that was searched
        target: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl CucoError {
    /// Coarse category, logged when a command fails.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError {
                ..
            }
            | Self::SourceNotFound {
                ..
            }
            | Self::SourceAlreadyExists {
                ..
            }
            | Self::BundleNotFound {
                ..
            }
            | Self::ManifestParseError {
                ..
            }
            | Self::ManifestValidationError {
                ..
            }
            | Self::RecordParseError {
                ..
            }
            | Self::InvalidResourceType {
                ..
            }
            | Self::UnknownEngine {
                ..
            }
            | Self::BundleNotInstalled {
                ..
            }
            | Self::TomlError(_)
            | Self::TomlSerError(_)
            | Self::JsonError(_) => ErrorCategory::Configuration,
            Self::InvalidDependency {
                ..
            }
            | Self::ResourceFileNotFound {
                ..
            }
            | Self::RegistryItemNotFound {
                ..
            }
            | Self::SourceLayoutInvalid {
                ..
            } => ErrorCategory::Resolution,
            Self::GitCommandError {
                ..
            }
            | Self::GitNotFound
            | Self::GitCloneFailed {
                ..
            }
            | Self::SourceUnavailable {
                ..
            } => ErrorCategory::Availability,
            Self::PathEscapesTarget {
                ..
            }
            | Self::MaterializeFailed {
                ..
            }
            | Self::IoError(_) => ErrorCategory::Materialization,
            Self::Other {
                ..
            } => ErrorCategory::Other,
        }
    }
}

/// Coarse error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Unknown names, malformed manifests, unsupported discriminants
    Configuration,
    /// A declared dependency could not be located
    Resolution,
    /// Network or repository access failure
    Availability,
    /// Writing into the target failed
    Materialization,
    /// Anything else
    Other,
}

/// Error wrapper that carries an optional suggestion and details for CLI display.
///
/// When displayed, errors show:
/// 1. **error**: the main message in red
/// 2. **details**: additional context in yellow (optional)
/// 3. **suggestion**: actionable next step in green (optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: CucoError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`CucoError`].
    #[must_use]
    pub const fn new(error: CucoError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions.
///
/// Recognizes [`CucoError`] anywhere in the error chain, then [`std::io::Error`],
/// and falls back to the formatted chain for everything else.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(cuco_error) = cause.downcast_ref::<CucoError>() {
            let chain = format_chain(&error);
            let context = create_error_context(cuco_error);
            return match (context.details.is_some(), chain) {
                (false, Some(chain)) => context.with_details(chain),
                _ => context,
            };
        }
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        let suggestion = match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                "Check file ownership and permissions of the target directory"
            }
            std::io::ErrorKind::NotFound => {
                "Check that the file or directory exists and the path is correct"
            }
            _ => "Check disk space and that no other process holds the files",
        };
        return ErrorContext::new(CucoError::Other {
            message: error.to_string(),
        })
        .with_suggestion(suggestion);
    }

    ErrorContext::new(CucoError::Other {
        message: format!("{error:#}"),
    })
}

/// Everything above the typed error in the chain, joined into one line.
fn format_chain(error: &anyhow::Error) -> Option<String> {
    let outer: Vec<String> = error
        .chain()
        .take_while(|cause| cause.downcast_ref::<CucoError>().is_none())
        .map(ToString::to_string)
        .collect();
    if outer.is_empty() {
        None
    } else {
        Some(outer.join(": "))
    }
}

fn create_error_context(error: &CucoError) -> ErrorContext {
    let rebuilt = clone_error(error);
    match error {
        CucoError::GitNotFound => ErrorContext::new(rebuilt)
            .with_suggestion("Install git from https://git-scm.com/ and make sure it is in PATH")
            .with_details("Named sources and agent-skills repositories are fetched with git"),
        CucoError::SourceNotFound {
            name,
        } => ErrorContext::new(rebuilt)
            .with_suggestion(format!("Register it with 'cuco source add {name} <git-url>'")),
        CucoError::SourceAlreadyExists {
            name,
            ..
        } => ErrorContext::new(rebuilt)
            .with_suggestion(format!("Use 'cuco source add {name} <url> --force' to replace it")),
        CucoError::SourceUnavailable {
            reason,
            ..
        } => ErrorContext::new(rebuilt)
            .with_details(reason.clone())
            .with_suggestion("Check your network connection and repository access, then retry"),
        CucoError::GitCloneFailed {
            reason,
            ..
        } => ErrorContext::new(rebuilt)
            .with_details(reason.trim().to_string())
            .with_suggestion("Verify the URL and your credentials (SSH agent or token)"),
        CucoError::SourceLayoutInvalid {
            marker,
            ..
        } => ErrorContext::new(rebuilt).with_suggestion(format!(
            "Repositories used as named sources must contain a '{marker}/' directory"
        )),
        CucoError::BundleNotFound {
            suggestions,
            ..
        } => {
            let ctx = ErrorContext::new(rebuilt)
                .with_suggestion("Run 'cuco bundle list' to see available bundles");
            if suggestions.is_empty() {
                ctx
            } else {
                ctx.with_details(format!("Did you mean: {}?", suggestions.join(", ")))
            }
        }
        CucoError::ManifestParseError {
            reason,
            ..
        } => ErrorContext::new(rebuilt)
            .with_details(reason.clone())
            .with_suggestion("Check bundle.json syntax and the 'type' of every dependency"),
        CucoError::RecordParseError {
            reason,
            ..
        } => ErrorContext::new(rebuilt).with_details(reason.clone()).with_suggestion(
            "Delete the record to fall back to conservative sync (every existing resource is treated as conflicting)",
        ),
        CucoError::BundleNotInstalled {
            name,
            ..
        } => ErrorContext::new(rebuilt)
            .with_suggestion(format!("Install it first with 'cuco install {name}'")),
        CucoError::UnknownEngine {
            ..
        } => ErrorContext::new(rebuilt).with_suggestion("Valid engines: github, claude, cuco"),
        CucoError::RegistryItemNotFound {
            resource_type,
            available,
            ..
        } => {
            let ctx = ErrorContext::new(rebuilt)
                .with_suggestion(format!("Run 'cuco list {resource_type}' to see what is available"));
            if available.is_empty() {
                ctx
            } else {
                ctx.with_details(format!("Available: {}", available.join(", ")))
            }
        }
        _ => ErrorContext::new(rebuilt),
    }
}

/// `CucoError` wraps non-clonable foreign errors, so rebuild by message for those.
fn clone_error(error: &CucoError) -> CucoError {
    match error {
        CucoError::GitCommandError {
            operation,
            stderr,
        } => CucoError::GitCommandError {
            operation: operation.clone(),
            stderr: stderr.clone(),
        },
        CucoError::GitNotFound => CucoError::GitNotFound,
        CucoError::GitCloneFailed {
            url,
            reason,
        } => CucoError::GitCloneFailed {
            url: url.clone(),
            reason: reason.clone(),
        },
        CucoError::ConfigError {
            message,
        } => CucoError::ConfigError {
            message: message.clone(),
        },
        CucoError::SourceNotFound {
            name,
        } => CucoError::SourceNotFound {
            name: name.clone(),
        },
        CucoError::SourceAlreadyExists {
            name,
            scope,
            existing_url,
        } => CucoError::SourceAlreadyExists {
            name: name.clone(),
            scope: scope.clone(),
            existing_url: existing_url.clone(),
        },
        CucoError::SourceUnavailable {
            name,
            url,
            reason,
        } => CucoError::SourceUnavailable {
            name: name.clone(),
            url: url.clone(),
            reason: reason.clone(),
        },
        CucoError::SourceLayoutInvalid {
            name,
            marker,
        } => CucoError::SourceLayoutInvalid {
            name: name.clone(),
            marker: marker.clone(),
        },
        CucoError::BundleNotFound {
            name,
            suggestions,
        } => CucoError::BundleNotFound {
            name: name.clone(),
            suggestions: suggestions.clone(),
        },
        CucoError::ManifestParseError {
            file,
            reason,
        } => CucoError::ManifestParseError {
            file: file.clone(),
            reason: reason.clone(),
        },
        CucoError::ManifestValidationError {
            reason,
        } => CucoError::ManifestValidationError {
            reason: reason.clone(),
        },
        CucoError::RecordParseError {
            file,
            reason,
        } => CucoError::RecordParseError {
            file: file.clone(),
            reason: reason.clone(),
        },
        CucoError::InvalidDependency {
            resource_type,
            name,
            reason,
        } => CucoError::InvalidDependency {
            resource_type: resource_type.clone(),
            name: name.clone(),
            reason: reason.clone(),
        },
        CucoError::ResourceFileNotFound {
            path,
            source_name,
        } => CucoError::ResourceFileNotFound {
            path: path.clone(),
            source_name: source_name.clone(),
        },
        CucoError::RegistryItemNotFound {
            resource_type,
            name,
            available,
        } => CucoError::RegistryItemNotFound {
            resource_type: resource_type.clone(),
            name: name.clone(),
            available: available.clone(),
        },
        CucoError::InvalidResourceType {
            resource_type,
        } => CucoError::InvalidResourceType {
            resource_type: resource_type.clone(),
        },
        CucoError::UnknownEngine {
            engine,
        } => CucoError::UnknownEngine {
            engine: engine.clone(),
        },
        CucoError::PathEscapesTarget {
            path,
        } => CucoError::PathEscapesTarget {
            path: path.clone(),
        },
        CucoError::MaterializeFailed {
            name,
            path,
            reason,
        } => CucoError::MaterializeFailed {
            name: name.clone(),
            path: path.clone(),
            reason: reason.clone(),
        },
        CucoError::BundleNotInstalled {
            name,
            target,
        } => CucoError::BundleNotInstalled {
            name: name.clone(),
            target: target.clone(),
        },
        CucoError::IoError(e) => CucoError::IoError(std::io::Error::new(e.kind(), e.to_string())),
        CucoError::TomlError(e) => CucoError::Other {
            message: format!("TOML parsing error: {e}"),
        },
        CucoError::TomlSerError(e) => CucoError::Other {
            message: format!("TOML serialization error: {e}"),
        },
        CucoError::JsonError(e) => CucoError::Other {
            message: format!("JSON error: {e}"),
        },
        CucoError::Other {
            message,
        } => CucoError::Other {
            message: message.clone(),
        },
    }
}
