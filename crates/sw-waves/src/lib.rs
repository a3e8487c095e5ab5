//! The wave catalog: concrete analyzer implementations (spec.md §4.3
//! priority table) plus the collaborator stand-ins and default registry
//! wiring used to assemble them into a [`sw_core::WaveRegistry`].

pub mod collaborators;
pub mod registry;
pub mod waves;

pub use registry::{default_registry, Collaborators};
pub use waves::*;
