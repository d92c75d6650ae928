//! # Story Model
//!
//! The "story bible" crate - holds the entities a prompt can draw on (novels,
//! acts, chapters, scenes, codex entries) and the library of reusable prompt
//! components. This crate contains no template logic; it is the read side the
//! resolution engine builds its context from.

pub mod codex;
pub mod entities;
pub mod library;

pub use codex::*;
pub use entities::*;
pub use library::*;
