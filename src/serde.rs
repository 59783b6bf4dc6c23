//! Serde support for the estimators (feature `with_serde`).
//!
//! [`HyperLogLog64`] serializes as the `(p, m, registers)` triple; decoding
//! validates that `m` and the register file are consistent with `p` before
//! an estimator is produced, so a deserialized value always upholds the
//! crate's invariants.
//!
//! [`HyperLogLogPlus`] serializes as `(p, sparse, dense)` where exactly one
//! of the two payloads is present: the sparse payload carries the pending
//! set plus the compressed list (element count and raw bytes; the delta
//! accumulator is rebuilt during validation), the dense payload carries the
//! register file.

use serde::de::Error as DeError;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dense::Dense;
use crate::estimator::{HyperLogLog64, HyperLogLogPlus};
use crate::representation::Representation;
use crate::sparse::Sparse;
use crate::varint::CompressedList;

impl Serialize for HyperLogLog64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let reg = self.registers().registers();
        let mut tup = serializer.serialize_tuple(3)?;
        tup.serialize_element(&self.precision())?;
        tup.serialize_element(&(reg.len() as u32))?;
        tup.serialize_element(reg)?;
        tup.end()
    }
}

impl<'de> Deserialize<'de> for HyperLogLog64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (p, m, reg): (u8, u32, Vec<u8>) = Deserialize::deserialize(deserializer)?;

        if !(HyperLogLog64::MIN_PRECISION..=HyperLogLog64::MAX_PRECISION).contains(&p) {
            return Err(D::Error::custom("precision out of supported range"));
        }
        if m != 1u32 << p || reg.len() != m as usize {
            return Err(D::Error::custom("register count inconsistent with precision"));
        }
        validate_registers(p, &reg).map_err(D::Error::custom)?;

        Ok(HyperLogLog64::from_dense(Dense::from_registers(p, reg)))
    }
}

impl Serialize for HyperLogLogPlus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(3)?;
        tup.serialize_element(&self.precision())?;
        match self.representation() {
            Representation::Sparse(sparse) => {
                let mut pending: Vec<u32> = sparse.tmp_set().iter().copied().collect();
                pending.sort_unstable();
                let list = sparse.list();
                tup.serialize_element(&Some((pending, list.count(), list.as_bytes())))?;
                tup.serialize_element(&None::<&[u8]>)?;
            }
            Representation::Dense(dense) => {
                tup.serialize_element(&None::<(Vec<u32>, u32, &[u8])>)?;
                tup.serialize_element(&Some(dense.registers()))?;
            }
        }
        tup.end()
    }
}

impl<'de> Deserialize<'de> for HyperLogLogPlus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        type SparsePayload = (Vec<u32>, u32, Vec<u8>);
        let (p, sparse, dense): (u8, Option<SparsePayload>, Option<Vec<u8>>) =
            Deserialize::deserialize(deserializer)?;

        if !(HyperLogLogPlus::MIN_PRECISION..=HyperLogLogPlus::MAX_PRECISION).contains(&p) {
            return Err(D::Error::custom("precision out of supported range"));
        }

        let repr = match (sparse, dense) {
            (Some((pending, count, bytes)), None) => {
                let list = validate_list(p, count, bytes).map_err(D::Error::custom)?;
                let tmp_set = pending.into_iter().collect();
                Representation::Sparse(Sparse::from_parts(p, tmp_set, list))
            }
            (None, Some(reg)) => {
                if reg.len() != 1usize << p {
                    return Err(D::Error::custom("register count inconsistent with precision"));
                }
                validate_registers(p, &reg).map_err(D::Error::custom)?;
                Representation::Dense(Dense::from_registers(p, reg))
            }
            _ => return Err(D::Error::custom("exactly one representation payload expected")),
        };

        Ok(HyperLogLogPlus::from_representation(repr))
    }
}

fn validate_registers(p: u8, reg: &[u8]) -> Result<(), &'static str> {
    let max_rank = 64 - p + 1;
    if reg.iter().any(|&r| r > max_rank) {
        return Err("register value exceeds maximum rank");
    }
    Ok(())
}

/// Check the compressed payload is a well-formed base-128 stream of `count`
/// values, and rebuild the list with its delta accumulator.
fn validate_list(p: u8, count: u32, bytes: Vec<u8>) -> Result<CompressedList, &'static str> {
    if u64::from(count) > 1u64 << p {
        return Err("sparse list larger than the register file");
    }

    let mut values = 0u32;
    let mut group_len = 0usize;
    for &b in &bytes {
        group_len += 1;
        // A u32 spans at most five 7-bit groups.
        if group_len > 5 {
            return Err("malformed varint encoding");
        }
        if b & 0x80 == 0 {
            values += 1;
            group_len = 0;
        }
    }
    if group_len != 0 {
        return Err("truncated varint encoding");
    }
    if values != count {
        return Err("sparse element count mismatch");
    }

    let list = CompressedList::from_parts(count, 0, bytes);
    let last = list.iter().last().unwrap_or(0);
    Ok(CompressedList::from_parts(count, last, list.into_bytes()))
}
