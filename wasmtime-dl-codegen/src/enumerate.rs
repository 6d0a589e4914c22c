// Signature Enumerator: the closed, ordered domain of signatures per convention.

use serde::Deserialize;

use crate::signature::{RawSignature, TypedSignature, ValueType, Width};

/// Arity limits for both conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Highest arity enumerated as a full cross product in the typed convention.
    pub typed_max_arity: usize,
    /// Highest arity of the homogeneous all-`i32` typed extension.
    pub typed_int_max_arity: usize,
    /// Highest arity enumerated in the raw convention.
    pub raw_max_arity: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            typed_max_arity: 4,
            typed_int_max_arity: 16,
            raw_max_arity: 7,
        }
    }
}

/// Return slot options, in enumeration order: the four numeric kinds, then none.
pub fn return_types() -> [Option<ValueType>; 5] {
    [
        Some(ValueType::I32),
        Some(ValueType::F32),
        Some(ValueType::I64),
        Some(ValueType::F64),
        None,
    ]
}

/// Lexicographic cartesian power of `alphabet`, the last position varying fastest.
fn product<T: Copy>(alphabet: &[T], arity: usize) -> Vec<Vec<T>> {
    let mut out = Vec::with_capacity(alphabet.len().pow(arity as u32));
    let mut idx = vec![0usize; arity];
    loop {
        out.push(idx.iter().map(|&i| alphabet[i]).collect());

        // Advance the odometer from the rightmost digit.
        let mut pos = arity;
        loop {
            if pos == 0 {
                return out;
            }
            pos -= 1;
            idx[pos] += 1;
            if idx[pos] < alphabet.len() {
                break;
            }
            idx[pos] = 0;
        }
    }
}

/// Enumerate the typed-closure domain.
///
/// Arities `0..=typed_max_arity` take the full cross product over
/// {i32, f32, i64, f64} with every return option. Arities above that, up to
/// `typed_int_max_arity`, only take the all-`i32` parameter list returning
/// nothing or `i32`.
pub fn typed_signatures(limits: &Limits) -> Vec<TypedSignature> {
    let mut out = Vec::with_capacity(typed_domain_size(limits));
    for arity in 0..=limits.typed_max_arity {
        for params in product(&ValueType::NUMERIC, arity) {
            for result in return_types() {
                out.push(TypedSignature::new(params.clone(), result));
            }
        }
    }
    for arity in (limits.typed_max_arity + 1)..=limits.typed_int_max_arity {
        let params = vec![ValueType::I32; arity];
        out.push(TypedSignature::new(params.clone(), None));
        out.push(TypedSignature::new(params, Some(ValueType::I32)));
    }
    out
}

/// Enumerate the raw stack-slot domain: width classes, arities `0..=raw_max_arity`.
pub fn raw_signatures(limits: &Limits) -> Vec<RawSignature> {
    let mut out = Vec::with_capacity(raw_domain_size(limits));
    for arity in 0..=limits.raw_max_arity {
        for params in product(&Width::ALL, arity) {
            for result in return_types() {
                out.push(RawSignature::new(params.clone(), result));
            }
        }
    }
    out
}

fn geometric(base: usize, max_arity: usize) -> usize {
    (0..=max_arity).map(|a| base.pow(a as u32)).sum()
}

/// Closed-form size of [`typed_signatures`].
pub fn typed_domain_size(limits: &Limits) -> usize {
    let full = geometric(ValueType::NUMERIC.len(), limits.typed_max_arity) * return_types().len();
    let homogeneous = limits.typed_int_max_arity.saturating_sub(limits.typed_max_arity) * 2;
    full + homogeneous
}

/// Closed-form size of [`raw_signatures`].
pub fn raw_domain_size(limits: &Limits) -> usize {
    geometric(Width::ALL.len(), limits.raw_max_arity) * return_types().len()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn default_domain_sizes() {
        let limits = Limits::default();
        assert_eq!(typed_domain_size(&limits), 341 * 5 + 12 * 2);
        assert_eq!(typed_domain_size(&limits), 1729);
        assert_eq!(raw_domain_size(&limits), 255 * 5);
        assert_eq!(typed_signatures(&limits).len(), 1729);
        assert_eq!(raw_signatures(&limits).len(), 1275);
    }

    #[test]
    fn domains_have_no_duplicates() {
        let limits = Limits::default();
        let typed = typed_signatures(&limits);
        let unique: HashSet<_> = typed.iter().collect();
        assert_eq!(unique.len(), typed.len());

        let raw = raw_signatures(&limits);
        let unique: HashSet<_> = raw.iter().collect();
        assert_eq!(unique.len(), raw.len());
    }

    #[test]
    fn typed_order_is_arity_then_lexicographic_then_return() {
        let sigs = typed_signatures(&Limits::default());
        assert_eq!(sigs[0], TypedSignature::new(vec![], Some(ValueType::I32)));
        assert_eq!(sigs[4], TypedSignature::new(vec![], None));
        assert_eq!(sigs[5], TypedSignature::new(vec![ValueType::I32], Some(ValueType::I32)));
        // (f32) block starts after the five (i32) entries.
        assert_eq!(sigs[10], TypedSignature::new(vec![ValueType::F32], Some(ValueType::I32)));
        // First arity-2 entry.
        assert_eq!(
            sigs[25],
            TypedSignature::new(vec![ValueType::I32, ValueType::I32], Some(ValueType::I32))
        );
        assert_eq!(
            sigs[30],
            TypedSignature::new(vec![ValueType::I32, ValueType::F32], Some(ValueType::I32))
        );
        // Homogeneous tail: none before i32, ending at arity 16.
        let n = sigs.len();
        assert_eq!(sigs[n - 2], TypedSignature::new(vec![ValueType::I32; 16], None));
        assert_eq!(sigs[n - 1], TypedSignature::new(vec![ValueType::I32; 16], Some(ValueType::I32)));
        assert_eq!(sigs[1705], TypedSignature::new(vec![ValueType::I32; 5], None));
    }

    #[test]
    fn typed_extension_is_homogeneous_i32_only() {
        for sig in typed_signatures(&Limits::default()) {
            if sig.arity() > 4 {
                assert!(sig.params.iter().all(|p| *p == ValueType::I32), "{sig}");
                assert!(matches!(sig.result, None | Some(ValueType::I32)), "{sig}");
            }
        }
        let ten = typed_signatures(&Limits::default())
            .into_iter()
            .filter(|s| s.arity() == 10)
            .collect::<Vec<_>>();
        assert_eq!(ten.len(), 2);
    }

    #[test]
    fn pointer_never_enumerated() {
        let limits = Limits::default();
        assert!(typed_signatures(&limits).iter().all(|s| {
            !s.params.contains(&ValueType::Pointer) && s.result != Some(ValueType::Pointer)
        }));
        assert!(raw_signatures(&limits).iter().all(|s| s.result != Some(ValueType::Pointer)));
    }

    #[test]
    fn raw_order_and_bounds() {
        let sigs = raw_signatures(&Limits::default());
        assert_eq!(sigs[0], RawSignature::new(vec![], Some(ValueType::I32)));
        assert_eq!(sigs[5], RawSignature::new(vec![Width::W32], Some(ValueType::I32)));
        assert_eq!(sigs[10], RawSignature::new(vec![Width::W64], Some(ValueType::I32)));
        let last = sigs.last().unwrap();
        assert_eq!(last.params, vec![Width::W64; 7]);
        assert_eq!(last.result, None);
        assert_eq!(sigs.iter().map(|s| s.arity()).max(), Some(7));
    }

    #[test]
    fn custom_limits_stay_consistent_with_closed_form() {
        let limits = Limits {
            typed_max_arity: 2,
            typed_int_max_arity: 3,
            raw_max_arity: 3,
        };
        assert_eq!(typed_signatures(&limits).len(), typed_domain_size(&limits));
        assert_eq!(typed_domain_size(&limits), (1 + 4 + 16) * 5 + 2);
        assert_eq!(raw_signatures(&limits).len(), raw_domain_size(&limits));

        // No homogeneous extension when the int limit does not exceed the full limit.
        let limits = Limits {
            typed_max_arity: 4,
            typed_int_max_arity: 2,
            raw_max_arity: 0,
        };
        assert_eq!(typed_signatures(&limits).len(), 341 * 5);
        assert_eq!(raw_signatures(&limits).len(), 5);
    }
}
