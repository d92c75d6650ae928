//! # Prompt Engine
//!
//! Turns prompt templates into the final text sent to a language model. A
//! template mixes two substitution languages:
//!
//! - **Components**: `[[name]]` inlines a reusable snippet from the user's
//!   component library, recursively.
//! - **Variables and functions**: `{scene.title}` reads story context and
//!   `{wordCount(content)}` calls a built-in function.
//!
//! ## Core Components
//!
//! - **context**: The per-request story data variables resolve against
//! - **component**: Component expansion and the lazily loaded registry
//! - **resolver**: Variable lookup, built-in functions and value formatting
//! - **engine**: Interleaves both passes under one depth ceiling
//!
//! Unresolved markers are left in the output verbatim and resolution always
//! returns text; nothing in this crate fails on a bad template.

pub mod clock;
pub mod component;
pub mod config;
pub mod context;
pub mod engine;
pub mod resolver;

pub use clock::*;
pub use component::*;
pub use config::*;
pub use context::*;
pub use engine::*;
pub use resolver::*;
