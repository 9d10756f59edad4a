//! cuco - bundle installer and sync engine for AI coding-assistant customizations
//!
//! A *bundle* is a `bundle.json` manifest naming agents, prompts, skills and
//! instructions and where each comes from. cuco resolves every entry to
//! concrete content, writes it into the layout of the project's assistant
//! (`.github/`, `.claude/` or `.cuco/`) and records what it wrote, so a later
//! sync can tell upstream changes from local edits.
//!
//! # Pipeline
//!
//! ```text
//! bundle.json ─► manifest ─► resolver ─► installer ─► .github/... + record
//!                              │                          │
//!                              ▼                          ▼
//!                 source (git cache, named sources)    sync (classify, apply)
//! ```
//!
//! # Modules
//!
//! ## Inputs
//! - [`manifest`] - `bundle.json` parsing, validation and bundle lookup
//! - [`config`] - named sources (project and global scope) and user paths
//! - [`source`] - named sources and agent-skills repositories resolved to git checkouts
//! - [`cache`] - cache layout, metadata and per-source locks
//! - [`git`] - async wrapper around the system `git` binary
//!
//! ## Resolution and materialization
//! - [`resolver`] - dependency entries to content paths, fail-fast
//! - [`target`] - engine detection and per-engine layouts
//! - [`templating`] - `{{name}}` / `{{NAME}}` placeholder substitution
//! - [`installer`] - rendering, atomic writes and install reports
//! - [`lockfile`] - per-bundle install records and content fingerprints
//! - [`sync`] - change classification and conflict resolution
//!
//! ## Supporting
//! - [`core`] - error types and resource types
//! - [`utils`] - filesystem, path and platform helpers
//! - [`cli`] - command-line interface
//!
//! # Bundle Example
//!
//! ```json
//! {
//!   "name": "team-review",
//!   "version": "1.2.0",
//!   "description": "Review helpers for the platform team",
//!   "dependencies": {
//!     "agents": [
//!       {"name": "reviewer", "type": "reference", "source": "agents/reviewer.agent.md"}
//!     ],
//!     "skills": [
//!       {"name": "review", "type": "custom", "source_name": "acme", "source": "skills/review"},
//!       {"name": "pdf", "type": "agentskills", "repo": "anthropics/skills"}
//!     ]
//!   },
//!   "copilotInstructions": {"type": "inline", "path": "instructions.md"}
//! }
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod git;
pub mod installer;
pub mod lockfile;
pub mod manifest;
pub mod resolver;
pub mod source;
pub mod sync;
pub mod target;
pub mod templating;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
