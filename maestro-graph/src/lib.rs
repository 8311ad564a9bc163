//! # Maestro Concept Graph
//!
//! Pre-computed relationships between programming concepts, used to expand a
//! search query with related terms before retrieval.
//!
//! When someone searches "Sendable warning", the graph expands the query with
//! "actor isolation", "data race", "thread safety" — terms the relevant
//! passages actually use. Expansion is:
//!
//! - **Pre-computed**: no model call at search time
//! - **Weighted**: stronger relationships rank higher
//! - **Bounded**: capped expansions, depth-limited traversal
//!
//! ## Usage
//!
//! ```rust
//! use maestro_graph::swift_concept_graph;
//!
//! let graph = swift_concept_graph();
//! let expanded = graph.expand("Sendable warning actor");
//! assert!(expanded.iter().any(|t| t == "actor isolation"));
//! ```

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Weighted concept graph and expansion
pub mod graph;

/// Pre-built graph for the Swift knowledge domain
pub mod swift;

pub use graph::{ConceptGraph, ExpansionOptions};
pub use swift::swift_concept_graph;
