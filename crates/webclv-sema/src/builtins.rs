//! Builtin function classification (C2).
//!
//! Four disjoint literal sets, seeded once at construction. `#`-hole
//! patterns are expanded across the vector-width replacements before being
//! stored, so lookups are plain set membership.

use rustc_hash::FxHashSet;

const HASH_REPLACEMENTS: [&str; 5] = ["2", "3", "4", "8", "16"];

const UNSAFE_MATH: &[&str] = &["fract", "frexp", "lgamma_r", "modf", "remquo", "sincos"];

const UNSAFE_VECTOR: &[&str] = &[
    "vload#",
    "vload_half",
    "vload_half#",
    "vloada_half#",
    "vstore#",
    "vstore_half",
    "vstore_half#",
    "vstorea_#",
    "vstore_half_rte",
    "vstore_half_rtz",
    "vstore_half_rtp",
    "vstore_half_rtn",
    "vstore_half#_rte",
    "vstore_half#_rtz",
    "vstore_half#_rtp",
    "vstore_half#_rtn",
    "vstorea_half_rte",
    "vstorea_half_rtz",
    "vstorea_half_rtp",
    "vstorea_half_rtn",
    "vstorea_half#_rte",
    "vstorea_half#_rtz",
    "vstorea_half#_rtp",
    "vstorea_half#_rtn",
];

const UNSAFE_ATOMIC: &[&str] = &[
    "atomic_add",
    "atomic_sub",
    "atomic_inc",
    "atomic_dec",
    "atomic_xchg",
    "atomic_cmpxchg",
    "atomic_min",
    "atomic_max",
    "atomic_and",
    "atomic_or",
    "atomic_xor",
];

const UNSUPPORTED: &[&str] = &[
    "async_work_group_copy",
    "async_work_group_strided_copy",
    "wait_group_events",
    "prefetch",
];

/// Classifies OpenCL builtin function names as unsafe, unsupported, or neutral.
pub struct BuiltinRegistry {
    unsafe_names: FxHashSet<String>,
    unsupported_names: FxHashSet<String>,
}

impl BuiltinRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut unsafe_names = FxHashSet::default();
        for group in [UNSAFE_MATH, UNSAFE_VECTOR, UNSAFE_ATOMIC] {
            expand_into(group, &mut unsafe_names);
        }
        let mut unsupported_names = FxHashSet::default();
        expand_into(UNSUPPORTED, &mut unsupported_names);
        Self {
            unsafe_names,
            unsupported_names,
        }
    }

    #[must_use]
    pub fn is_unsafe(&self, name: &str) -> bool {
        self.unsafe_names.contains(name)
    }

    #[must_use]
    pub fn is_unsupported(&self, name: &str) -> bool {
        self.unsupported_names.contains(name)
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn expand_into(patterns: &[&str], out: &mut FxHashSet<String>) {
    for pattern in patterns {
        match pattern.rfind('#') {
            None => {
                out.insert((*pattern).to_string());
            }
            Some(hash_pos) => {
                let (before, after) = (&pattern[..hash_pos], &pattern[hash_pos + 1..]);
                for replacement in HASH_REPLACEMENTS {
                    out.insert(format!("{before}{replacement}{after}"));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsafe_math_builtins_are_classified() {
        let reg = BuiltinRegistry::new();
        assert!(reg.is_unsafe("sincos"));
        assert!(!reg.is_unsupported("sincos"));
    }

    #[test]
    fn hash_hole_expands_across_vector_widths() {
        let reg = BuiltinRegistry::new();
        for width in ["2", "3", "4", "8", "16"] {
            assert!(reg.is_unsafe(&format!("vload{width}")), "vload{width} should be unsafe");
            assert!(reg.is_unsafe(&format!("vstore_half{width}_rte")));
        }
        assert!(!reg.is_unsafe("vload5"));
    }

    #[test]
    fn unsupported_builtins_are_classified() {
        let reg = BuiltinRegistry::new();
        assert!(reg.is_unsupported("prefetch"));
        assert!(!reg.is_unsafe("prefetch"));
    }

    #[test]
    fn neutral_builtins_are_classified_as_neither() {
        let reg = BuiltinRegistry::new();
        assert!(!reg.is_unsafe("get_global_id"));
        assert!(!reg.is_unsupported("get_global_id"));
    }
}
