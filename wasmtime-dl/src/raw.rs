// Raw-slot marshalling used by the generated raw dispatch arms.
//
// Parameters are read out of the untyped slot array according to the kind the
// arm's pattern matched, then passed to the native function through the integer
// carrier of their width. Floats and pointers travel as their bit patterns.

use wasmtime::ValRaw;

use crate::param::ParamType;

/// Read a 32-bit slot matched as `I32`, `F32` or `Pointer`.
#[inline]
pub fn load_w32(slot: ValRaw, kind: ParamType) -> i32 {
    debug_assert!(!kind.is_wide(), "{kind} is not a 32-bit kind");
    match kind {
        ParamType::F32 => slot.get_f32() as i32,
        _ => slot.get_i32(),
    }
}

/// Read a 64-bit slot matched as `I64` or `F64`.
#[inline]
pub fn load_w64(slot: ValRaw, kind: ParamType) -> i64 {
    debug_assert!(kind.is_wide(), "{kind} is not a 64-bit kind");
    match kind {
        ParamType::F64 => slot.get_f64() as i64,
        _ => slot.get_i64(),
    }
}

// Results go back through slot 0; the slot array is at least one entry long
// whenever the declared type has a result.

#[inline]
pub fn store_i32(slots: &mut [ValRaw], value: i32) {
    slots[0] = ValRaw::i32(value);
}

#[inline]
pub fn store_f32(slots: &mut [ValRaw], value: f32) {
    slots[0] = ValRaw::f32(value.to_bits());
}

#[inline]
pub fn store_i64(slots: &mut [ValRaw], value: i64) {
    slots[0] = ValRaw::i64(value);
}

#[inline]
pub fn store_f64(slots: &mut [ValRaw], value: f64) {
    slots[0] = ValRaw::f64(value.to_bits());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn w32_slots_carry_all_three_kinds() {
        assert_eq!(load_w32(ValRaw::i32(-5), ParamType::I32), -5);
        assert_eq!(load_w32(ValRaw::i32(4096), ParamType::Pointer), 4096);
        let bits = 1.5f32.to_bits();
        assert_eq!(load_w32(ValRaw::f32(bits), ParamType::F32), bits as i32);
    }

    #[test]
    fn w64_slots_carry_both_kinds() {
        assert_eq!(load_w64(ValRaw::i64(-1 << 40), ParamType::I64), -1 << 40);
        let bits = (-2.25f64).to_bits();
        assert_eq!(load_w64(ValRaw::f64(bits), ParamType::F64), bits as i64);
    }

    #[test]
    fn stores_write_slot_zero() {
        let mut slots = [ValRaw::i32(0), ValRaw::i32(7)];
        store_f32(&mut slots, 0.5);
        assert_eq!(f32::from_bits(slots[0].get_f32()), 0.5);
        assert_eq!(slots[1].get_i32(), 7);

        store_f64(&mut slots, -8.0);
        assert_eq!(f64::from_bits(slots[0].get_f64()), -8.0);
        store_i64(&mut slots, i64::MAX);
        assert_eq!(slots[0].get_i64(), i64::MAX);
        store_i32(&mut slots, -3);
        assert_eq!(slots[0].get_i32(), -3);
    }
}
