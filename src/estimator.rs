//! User-facing estimators.
//!
//! [`HyperLogLogPlus`] starts in the sparse representation and promotes
//! itself to the dense register file once the sorted list outgrows it.
//! [`HyperLogLog64`] is dense from construction, supports higher precisions,
//! and adds a probabilistic membership probe.
//!
//! Both operate on 64-bit hash values supplied by the caller; neither hashes
//! raw items itself.

use std::fmt::{Debug, Formatter};

use crate::dense::Dense;
use crate::estimate;
use crate::representation::{Representation, RepresentationTrait};
use crate::sparse::Sparse;
use crate::Error;

/// Sparse-capable HyperLogLog++ estimator.
///
/// # Examples
///
/// ```
/// use hyperloglog_estimator::HyperLogLogPlus;
///
/// let mut hll = HyperLogLogPlus::new(14)?;
/// hll.add(0x9e3779b97f4a7c15);
/// hll.add(0x9e3779b97f4a7c15);
/// hll.add(0xc2b2ae3d27d4eb4f);
/// assert_eq!(hll.count(), 2);
/// # Ok::<(), hyperloglog_estimator::Error>(())
/// ```
#[derive(Clone, PartialEq)]
pub struct HyperLogLogPlus {
    repr: Representation,
}

impl HyperLogLogPlus {
    /// Lowest supported precision.
    pub const MIN_PRECISION: u8 = 4;
    /// Highest supported precision.
    pub const MAX_PRECISION: u8 = 18;

    /// Create an empty estimator with `2^p` registers.
    pub fn new(p: u8) -> Result<Self, Error> {
        if !(Self::MIN_PRECISION..=Self::MAX_PRECISION).contains(&p) {
            return Err(Error::InvalidPrecision);
        }
        Ok(Self {
            repr: Representation::Sparse(Sparse::new(p)),
        })
    }

    /// Observe a hash value. Monotone: re-adding a hash never changes state.
    pub fn add(&mut self, hash: u64) {
        self.repr.insert_hash(hash);
        let promoted = match &mut self.repr {
            Representation::Sparse(sparse) if sparse.should_promote() => Some(sparse.promote()),
            _ => None,
        };
        if let Some(dense) = promoted {
            self.repr = Representation::Dense(dense);
        }
    }

    /// Cardinality estimate. Flushes pending sparse entries, so the borrow
    /// is mutable; the estimate itself does not change state otherwise.
    pub fn count(&mut self) -> u64 {
        self.repr.count()
    }

    /// Fold `other` into `self`. Fails if the precisions differ, in which
    /// case `self` is untouched.
    ///
    /// The receiver is promoted to the dense representation first; the other
    /// side's content is decoded in place without mutating it.
    pub fn merge(&mut self, other: &Self) -> Result<(), Error> {
        if self.precision() != other.precision() {
            return Err(Error::PrecisionMismatch);
        }

        let promoted = match &mut self.repr {
            Representation::Sparse(sparse) => Some(sparse.promote()),
            Representation::Dense(_) => None,
        };
        if let Some(dense) = promoted {
            self.repr = Representation::Dense(dense);
        }
        if let Representation::Dense(dense) = &mut self.repr {
            match &other.repr {
                Representation::Sparse(sparse) => sparse.fold_into(dense),
                Representation::Dense(other_dense) => dense.merge_registers(other_dense),
            }
        }
        Ok(())
    }

    /// Reset to the empty sparse state, keeping the precision.
    pub fn clear(&mut self) {
        self.repr = Representation::Sparse(Sparse::new(self.precision()));
    }

    /// Precision chosen at construction.
    pub fn precision(&self) -> u8 {
        match &self.repr {
            Representation::Sparse(s) => s.precision(),
            Representation::Dense(d) => d.precision(),
        }
    }

    /// Whether the estimator still uses the sparse representation.
    pub fn is_sparse(&self) -> bool {
        matches!(self.repr, Representation::Sparse(_))
    }

    /// Memory footprint, inline plus heap.
    pub fn size_of(&self) -> usize {
        self.repr.size_of()
    }

    #[cfg(feature = "with_serde")]
    pub(crate) fn representation(&self) -> &Representation {
        &self.repr
    }

    #[cfg(feature = "with_serde")]
    pub(crate) fn from_representation(repr: Representation) -> Self {
        Self { repr }
    }
}

impl Debug for HyperLogLogPlus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let repr = if self.is_sparse() { "Sparse" } else { "Dense" };
        write!(
            f,
            "HyperLogLogPlus {{ p: {}, representation: {}, size: {} }}",
            self.precision(),
            repr,
            self.size_of()
        )
    }
}

/// Dense-only estimator over 64-bit hashes, up to precision 26.
///
/// # Examples
///
/// ```
/// use hyperloglog_estimator::HyperLogLog64;
///
/// let mut hll = HyperLogLog64::new(16)?;
/// hll.add(0x9e3779b97f4a7c15);
/// assert!(hll.seen(0x9e3779b97f4a7c15));
/// assert_eq!(hll.count(), 1);
/// # Ok::<(), hyperloglog_estimator::Error>(())
/// ```
#[derive(Clone, PartialEq)]
pub struct HyperLogLog64 {
    registers: Dense,
}

impl HyperLogLog64 {
    /// Lowest supported precision.
    pub const MIN_PRECISION: u8 = 4;
    /// Highest supported precision.
    pub const MAX_PRECISION: u8 = 26;

    /// Create an empty estimator with `2^p` registers.
    pub fn new(p: u8) -> Result<Self, Error> {
        if !(Self::MIN_PRECISION..=Self::MAX_PRECISION).contains(&p) {
            return Err(Error::InvalidPrecision);
        }
        Ok(Self {
            registers: Dense::new(p),
        })
    }

    /// Observe a hash value. Monotone: re-adding a hash never changes state.
    pub fn add(&mut self, hash: u64) {
        self.registers.insert_hash(hash);
    }

    /// Probabilistic membership probe: `true` means a hash with this
    /// register index and at least this rank was observed. False positives
    /// are possible; a hash that was added is never reported unseen.
    pub fn seen(&self, hash: u64) -> bool {
        self.registers.seen(hash)
    }

    /// Cardinality estimate.
    pub fn count(&self) -> u64 {
        estimate::cardinality(self.registers.precision(), self.registers.registers())
    }

    /// Fold `other` into `self`. Fails if the precisions differ, in which
    /// case `self` is untouched.
    pub fn merge(&mut self, other: &Self) -> Result<(), Error> {
        if self.precision() != other.precision() {
            return Err(Error::PrecisionMismatch);
        }
        self.registers.merge_registers(&other.registers);
        Ok(())
    }

    /// Reset all registers to zero, keeping the precision.
    pub fn clear(&mut self) {
        self.registers.clear();
    }

    /// Precision chosen at construction.
    pub fn precision(&self) -> u8 {
        self.registers.precision()
    }

    /// Memory footprint, inline plus heap.
    pub fn size_of(&self) -> usize {
        self.registers.size_of()
    }

    #[cfg(feature = "with_serde")]
    pub(crate) fn registers(&self) -> &Dense {
        &self.registers
    }

    #[cfg(feature = "with_serde")]
    pub(crate) fn from_dense(registers: Dense) -> Self {
        Self { registers }
    }
}

impl Debug for HyperLogLog64 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "HyperLogLog64 {{ p: {}, estimate: {}, size: {} }}",
            self.precision(),
            self.count(),
            self.size_of()
        )
    }
}
