//! Tagged representation of a sparse-capable estimator.
//!
//! An estimator is in exactly one of two states: the sparse encoded-hash
//! store, or the dense register file. Transitions replace the variant, so
//! the sparse buffers are released the moment the registers are allocated.

use enum_dispatch::enum_dispatch;

use crate::dense::Dense;
use crate::sparse::Sparse;

/// Representation states of a sparse-capable estimator.
#[derive(Clone, Debug, PartialEq)]
#[enum_dispatch]
pub(crate) enum Representation {
    Sparse(Sparse),
    Dense(Dense),
}

/// Operations every representation supports.
#[enum_dispatch(Representation)]
pub(crate) trait RepresentationTrait {
    /// Absorb a 64-bit hash value.
    fn insert_hash(&mut self, hash: u64);
    /// Cardinality estimate; flushes pending sparse entries first.
    fn count(&mut self) -> u64;
    /// Memory footprint, inline plus heap.
    fn size_of(&self) -> usize;
}
