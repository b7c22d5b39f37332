//! Arithmetic and logic unit
//!
//! Pure functions over `bits`-wide unsigned operands (1 to 64 bits). Each
//! returns the wrapped result and every flag the operation defines; the
//! caller writes only the flags its instruction declares.

use mcu_spec::Flag;

/// Result value plus the flags an operation produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub value: u64,
    flags: [Option<bool>; Flag::COUNT],
}

impl Outcome {
    /// Outcome with Zero, Sign and Parity derived from `value`
    fn new(value: u64, bits: u32) -> Self {
        let mut flags = [None; Flag::COUNT];
        flags[Flag::Zero.ordinal()] = Some(value == 0);
        flags[Flag::Sign.ordinal()] = Some(value & sign_bit(bits) != 0);
        flags[Flag::Parity.ordinal()] = Some(value.count_ones() % 2 == 0);
        Self { value, flags }
    }

    fn with(mut self, flag: Flag, value: bool) -> Self {
        self.flags[flag.ordinal()] = Some(value);
        self
    }

    /// Value the operation assigns to `flag`, if it defines one
    #[inline]
    pub fn flag(&self, flag: Flag) -> Option<bool> {
        self.flags[flag.ordinal()]
    }

    fn sign(&self) -> bool {
        self.flag(Flag::Sign).unwrap_or(false)
    }
}

#[inline]
pub fn mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

#[inline]
fn sign_bit(bits: u32) -> u64 {
    1u64 << (bits - 1)
}

/// `a + b + carry`
pub fn add(a: u64, b: u64, carry: bool, bits: u32) -> Outcome {
    let m = mask(bits);
    let (a, b) = (a & m, b & m);
    let sum = a as u128 + b as u128 + carry as u128;
    let value = (sum & m as u128) as u64;

    let half = (a & 0xF) + (b & 0xF) + carry as u64 > 0xF;
    let overflow = (a ^ value) & (b ^ value) & sign_bit(bits) != 0;

    Outcome::new(value, bits)
        .with(Flag::Carry, sum > m as u128)
        .with(Flag::Overflow, overflow)
        .with(Flag::HalfCarry, half)
}

/// `a - b - borrow`
pub fn sub(a: u64, b: u64, borrow: bool, bits: u32) -> Outcome {
    let m = mask(bits);
    let (a, b) = (a & m, b & m);
    let value = a.wrapping_sub(b).wrapping_sub(borrow as u64) & m;

    let carry = b as u128 + borrow as u128 > a as u128;
    let half = (b & 0xF) + borrow as u64 > (a & 0xF);
    let overflow = (a ^ b) & (a ^ value) & sign_bit(bits) != 0;

    Outcome::new(value, bits)
        .with(Flag::Carry, carry)
        .with(Flag::Overflow, overflow)
        .with(Flag::HalfCarry, half)
}

/// Result of AND / OR / XOR; overflow is cleared
pub fn logic(value: u64, bits: u32) -> Outcome {
    Outcome::new(value & mask(bits), bits).with(Flag::Overflow, false)
}

/// One's complement; carry is set
pub fn complement(a: u64, bits: u32) -> Outcome {
    Outcome::new(!a & mask(bits), bits)
        .with(Flag::Carry, true)
        .with(Flag::Overflow, false)
}

/// Two's complement negation
pub fn negate(a: u64, bits: u32) -> Outcome {
    sub(0, a, false, bits)
}

// Shifts report Overflow as Sign xor Carry
fn shifted(value: u64, carry: bool, bits: u32) -> Outcome {
    let outcome = Outcome::new(value, bits).with(Flag::Carry, carry);
    let overflow = outcome.sign() ^ carry;
    outcome.with(Flag::Overflow, overflow)
}

/// Shift left by one, high bit into carry
pub fn shift_left(a: u64, bits: u32) -> Outcome {
    let a = a & mask(bits);
    shifted((a << 1) & mask(bits), a & sign_bit(bits) != 0, bits)
        .with(Flag::HalfCarry, a & 0x08 != 0)
}

/// Logical shift right by one, low bit into carry
pub fn shift_right(a: u64, bits: u32) -> Outcome {
    let a = a & mask(bits);
    shifted(a >> 1, a & 1 != 0, bits)
}

/// Arithmetic shift right by one: the sign bit is kept
pub fn arithmetic_shift_right(a: u64, bits: u32) -> Outcome {
    let a = a & mask(bits);
    shifted((a >> 1) | (a & sign_bit(bits)), a & 1 != 0, bits)
}

/// Rotate right through carry
pub fn rotate_right(a: u64, carry: bool, bits: u32) -> Outcome {
    let a = a & mask(bits);
    let high = if carry { sign_bit(bits) } else { 0 };
    shifted((a >> 1) | high, a & 1 != 0, bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_with_carry_out() {
        let out = add(200, 100, false, 8);
        assert_eq!(out.value, 44);
        assert_eq!(out.flag(Flag::Carry), Some(true));
        assert_eq!(out.flag(Flag::Zero), Some(false));
        assert_eq!(out.flag(Flag::Overflow), Some(false));
    }

    #[test]
    fn test_add_signed_overflow() {
        let out = add(0x7F, 1, false, 8);
        assert_eq!(out.value, 0x80);
        assert_eq!(out.flag(Flag::Overflow), Some(true));
        assert_eq!(out.flag(Flag::Sign), Some(true));
        assert_eq!(out.flag(Flag::HalfCarry), Some(true));
        assert_eq!(out.flag(Flag::Carry), Some(false));
    }

    #[test]
    fn test_add_to_zero() {
        let out = add(0xFF, 1, false, 8);
        assert_eq!(out.value, 0);
        assert_eq!(out.flag(Flag::Zero), Some(true));
        assert_eq!(out.flag(Flag::Carry), Some(true));
        assert_eq!(out.flag(Flag::Parity), Some(true));
    }

    #[test]
    fn test_sub_borrow() {
        let out = sub(1, 2, false, 8);
        assert_eq!(out.value, 0xFF);
        assert_eq!(out.flag(Flag::Carry), Some(true));
        assert_eq!(out.flag(Flag::Sign), Some(true));
        assert_eq!(out.flag(Flag::HalfCarry), Some(true));

        let out = sub(5, 4, true, 8);
        assert_eq!(out.value, 0);
        assert_eq!(out.flag(Flag::Zero), Some(true));
        assert_eq!(out.flag(Flag::Carry), Some(false));
    }

    #[test]
    fn test_sub_signed_overflow() {
        // -128 - 1
        let out = sub(0x80, 1, false, 8);
        assert_eq!(out.value, 0x7F);
        assert_eq!(out.flag(Flag::Overflow), Some(true));
    }

    #[test]
    fn test_logic_and_complement() {
        let out = logic(0b1010_0000, 8);
        assert_eq!(out.flag(Flag::Parity), Some(true));
        assert_eq!(out.flag(Flag::Overflow), Some(false));
        assert_eq!(out.flag(Flag::Carry), None);

        let out = complement(0x0F, 8);
        assert_eq!(out.value, 0xF0);
        assert_eq!(out.flag(Flag::Carry), Some(true));
    }

    #[test]
    fn test_negate() {
        assert_eq!(negate(1, 8).value, 0xFF);
        assert_eq!(negate(0, 8).flag(Flag::Carry), Some(false));
        assert_eq!(negate(0x80, 8).flag(Flag::Overflow), Some(true));
    }

    #[test]
    fn test_shifts() {
        let out = shift_left(0x81, 8);
        assert_eq!(out.value, 0x02);
        assert_eq!(out.flag(Flag::Carry), Some(true));
        assert_eq!(out.flag(Flag::Overflow), Some(true));

        let out = shift_right(0x81, 8);
        assert_eq!(out.value, 0x40);
        assert_eq!(out.flag(Flag::Carry), Some(true));
        assert_eq!(out.flag(Flag::Sign), Some(false));

        let out = arithmetic_shift_right(0x81, 8);
        assert_eq!(out.value, 0xC0);
        assert_eq!(out.flag(Flag::Carry), Some(true));
        assert_eq!(out.flag(Flag::Overflow), Some(false));

        let out = rotate_right(0x02, true, 8);
        assert_eq!(out.value, 0x81);
        assert_eq!(out.flag(Flag::Carry), Some(false));
    }

    #[test]
    fn test_word_width() {
        let out = add(0x00FF, 1, false, 16);
        assert_eq!(out.value, 0x0100);
        assert_eq!(out.flag(Flag::Carry), Some(false));

        let out = sub(0, 1, false, 16);
        assert_eq!(out.value, 0xFFFF);
        assert_eq!(out.flag(Flag::Carry), Some(true));

        let out = add(u64::MAX, 1, false, 64);
        assert_eq!(out.value, 0);
        assert_eq!(out.flag(Flag::Carry), Some(true));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_add_matches_wrapping(a in 0u64..256, b in 0u64..256, c in any::<bool>()) {
                let out = add(a, b, c, 8);
                let wide = a + b + c as u64;
                prop_assert_eq!(out.value, wide % 256);
                prop_assert_eq!(out.flag(Flag::Carry), Some(wide > 255));
                prop_assert_eq!(out.flag(Flag::Zero), Some(wide % 256 == 0));
            }

            #[test]
            fn prop_add_overflow_is_signed_range(a in 0u64..256, b in 0u64..256) {
                let out = add(a, b, false, 8);
                let signed = (a as u8 as i8) as i16 + (b as u8 as i8) as i16;
                prop_assert_eq!(out.flag(Flag::Overflow), Some(!(-128..=127).contains(&signed)));
            }

            #[test]
            fn prop_sub_inverts_add(a in 0u64..256, b in 0u64..256) {
                let sum = add(a, b, false, 8).value;
                prop_assert_eq!(sub(sum, b, false, 8).value, a);
            }

            #[test]
            fn prop_sub_borrow(a in 0u64..256, b in 0u64..256, c in any::<bool>()) {
                let out = sub(a, b, c, 8);
                prop_assert_eq!(out.flag(Flag::Carry), Some(b + (c as u64) > a));
                let signed = (a as u8 as i8) as i16 - (b as u8 as i8) as i16 - c as i16;
                prop_assert_eq!(out.flag(Flag::Overflow), Some(!(-128..=127).contains(&signed)));
            }

            #[test]
            fn prop_rotate_round_trip(a in 0u64..256) {
                // Rotating through carry nine times restores the value
                let mut value = a;
                let mut carry = false;
                for _ in 0..9 {
                    let out = rotate_right(value, carry, 8);
                    value = out.value;
                    carry = out.flag(Flag::Carry).unwrap_or(false);
                }
                prop_assert_eq!(value, a);
            }
        }
    }
}
