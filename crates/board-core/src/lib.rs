//! Hex board descriptors and their artifact format.
//!
//! This crate provides:
//! - A validated, immutable model of one board's topology and resource data
//! - A builder that accumulates the model field by field
//! - A deterministic emitter producing a self-contained text artifact
//! - A loader that reads artifacts back into descriptors
//!
//! # Architecture
//!
//! ```text
//! definition (JSON) -> DescriptorBuilder -> BoardDescriptor -> ArtifactEmitter -> text
//!                                                  ^                               |
//!                                                  +------------ loader -----------+
//! ```
//!
//! Nothing here performs I/O. Reading definitions from disk and writing
//! artifacts out is left to the caller (see the `board-gen` binary).
//!
//! # Modules
//!
//! - [`hex`]: Grid coordinates and hex corners
//! - [`resource`]: Resource labels
//! - [`descriptor`]: Board model and builder
//! - [`validate`]: Structural invariants
//! - [`render`]: Per-shape value rendering
//! - [`emitter`]: Artifact layout
//! - [`loader`]: Artifact reading
//! - [`definition`]: JSON board definitions

pub mod definition;
pub mod descriptor;
pub mod emitter;
pub mod hex;
pub mod loader;
pub mod render;
pub mod resource;
pub mod validate;

// Re-export commonly used types
pub use definition::{decode_board, decode_definition, BoardDefinition, DefinitionError};
pub use descriptor::{BoardDescriptor, DescriptorBuilder, NestedSeq, Whitelists};
pub use emitter::{ArtifactEmitter, FORMAT_VERSION};
pub use hex::Point;
pub use loader::{load, LoadError, LoadedArtifact};
pub use resource::{Resource, UnknownResource};
pub use validate::ValidationError;
