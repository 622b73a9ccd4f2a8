//! Gene annotation and reference sequence inputs.
//!
//! The graph builder needs two things from the outside world: the exon
//! intervals annotated for each gene (to recover exon boundaries around an
//! event's introns) and the bases of the reference genome.

mod gtf;
mod reference;

pub use gtf::{AnnotationError, ExonIndex};
pub use reference::{InMemoryReference, IndexedFasta, ReferenceError, SequenceSource};
