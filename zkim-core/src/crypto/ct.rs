//! Constant-time comparison helpers.
//!
//! Used wherever a secret-derived value is compared against an
//! attacker-influenced one (signature verification short-circuits are left
//! to the `ml-dsa` crate itself; this module covers our own Merkle-root and
//! tag comparisons).

use subtle::ConstantTimeEq;

pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
