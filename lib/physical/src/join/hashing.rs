use quack_model::{JoinKey, Row, RowValue, Variable};
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// The hash of a row that binds none of the variables of the join key, or of any row under the
/// empty key.
///
/// All such rows share a single bucket.
pub const NO_KEY_HASH: u64 = 0x7c15_9e37_79b9_7f4a;

/// Computes the contributions of single bindings to the key hash of a row.
///
/// Implementations must discriminate both the variable and the value: `(None, 1)`, `(None, 2)`,
/// `(Some(?a), 1)` and `(Some(?b), 1)` should all hash differently with high probability.
pub trait RowHasher<X>: Send + Sync {
    /// Hashes `value` bound to `variable`. [None] hashes the value alone.
    fn hash_binding(&self, variable: Option<&Variable>, value: &X) -> u64;

    /// Hashes a key variable that a row does not bind. Must never return zero.
    fn hash_unbound(&self, variable: &Variable) -> u64;
}

/// A [RowHasher] for all hashable values, based on [FxHasher].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FxRowHasher;

impl<X: Hash> RowHasher<X> for FxRowHasher {
    fn hash_binding(&self, variable: Option<&Variable>, value: &X) -> u64 {
        let mut hasher = FxHasher::default();
        match variable {
            None => hasher.write_u8(0),
            Some(variable) => {
                hasher.write_u8(1);
                variable.as_str().hash(&mut hasher);
            }
        }
        value.hash(&mut hasher);
        mix(hasher.finish())
    }

    fn hash_unbound(&self, variable: &Variable) -> u64 {
        let mut hasher = FxHasher::default();
        hasher.write_u8(2);
        variable.as_str().hash(&mut hasher);
        mix(hasher.finish()) | 1
    }
}

/// Computes the hash of `row` under `key`.
///
/// Returns [NO_KEY_HASH] if the key is empty or if the row binds none of its variables. Otherwise,
/// the contributions of all key variables are summed up. As addition is commutative, the result
/// does not depend on the order of the key variables. Unbound key variables contribute as well,
/// so adding a variable to the key changes the hash even if the row does not bind it.
///
/// The result is never [NO_KEY_HASH] for rows that bind at least one key variable.
pub fn hash_row<X: RowValue, H: RowHasher<X> + ?Sized>(
    hasher: &H,
    key: &JoinKey,
    row: &Row<X>,
) -> u64 {
    let mut combined = 0u64;
    let mut any_bound = false;
    for variable in key {
        let contribution = match row.get(variable) {
            Some(value) => {
                any_bound = true;
                hasher.hash_binding(Some(variable), value)
            }
            None => hasher.hash_unbound(variable),
        };
        combined = combined.wrapping_add(contribution);
    }

    if !any_bound {
        return NO_KEY_HASH;
    }

    let hash = mix(combined);
    if hash == NO_KEY_HASH {
        hash.wrapping_add(1)
    } else {
        hash
    }
}

/// Returns whether `row` binds every variable of `key`.
pub fn binds_key<X: RowValue>(key: &JoinKey, row: &Row<X>) -> bool {
    key.iter().all(|variable| row.contains(variable))
}

/// The finalizer of SplitMix64. A bijection on `u64`.
fn mix(mut value: u64) -> u64 {
    value ^= value >> 30;
    value = value.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    value ^= value >> 27;
    value = value.wrapping_mul(0x94d0_49bb_1331_11eb);
    value ^ (value >> 31)
}
