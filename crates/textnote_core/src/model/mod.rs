//! In-memory document model for dated notes.
//!
//! # Responsibility
//! - Define the section/content-item shapes shared by daily notes and
//!   month archives.
//! - Own the per-section string rendering used by the serializers.
//!
//! # Invariants
//! - A section name never changes after construction.
//! - Content order is insertion order until an archive explicitly sorts it.

pub mod section;
