// Catalog of well known target formats.
//
// These are plain constant data; the codec gives them no special treatment
// beyond the identity tag, and callers describing some other machine's
// floats build their own FloatFormat the same way.

use crate::descriptor::{ByteOrder, FloatFormat, FormatIdentity, IntegerBit, NativeKind};

pub static IEEE_HALF_BIG: FloatFormat = FloatFormat {
    name: "ieee_half_big",
    byte_order: ByteOrder::Big,
    total_bits: 16,
    sign_bit: 0,
    exponent_start: 1,
    exponent_length: 5,
    exponent_bias: 15,
    exponent_nan: 31,
    mantissa_start: 6,
    mantissa_length: 10,
    integer_bit: IntegerBit::Implicit,
    identity: FormatIdentity::Native(NativeKind::Half),
};

pub static IEEE_HALF_LITTLE: FloatFormat = FloatFormat {
    name: "ieee_half_little",
    byte_order: ByteOrder::Little,
    total_bits: 16,
    sign_bit: 0,
    exponent_start: 1,
    exponent_length: 5,
    exponent_bias: 15,
    exponent_nan: 31,
    mantissa_start: 6,
    mantissa_length: 10,
    integer_bit: IntegerBit::Implicit,
    identity: FormatIdentity::Native(NativeKind::Half),
};

pub static IEEE_SINGLE_BIG: FloatFormat = FloatFormat {
    name: "ieee_single_big",
    byte_order: ByteOrder::Big,
    total_bits: 32,
    sign_bit: 0,
    exponent_start: 1,
    exponent_length: 8,
    exponent_bias: 127,
    exponent_nan: 255,
    mantissa_start: 9,
    mantissa_length: 23,
    integer_bit: IntegerBit::Implicit,
    identity: FormatIdentity::Native(NativeKind::Single),
};

pub static IEEE_SINGLE_LITTLE: FloatFormat = FloatFormat {
    name: "ieee_single_little",
    byte_order: ByteOrder::Little,
    total_bits: 32,
    sign_bit: 0,
    exponent_start: 1,
    exponent_length: 8,
    exponent_bias: 127,
    exponent_nan: 255,
    mantissa_start: 9,
    mantissa_length: 23,
    integer_bit: IntegerBit::Implicit,
    identity: FormatIdentity::Native(NativeKind::Single),
};

pub static IEEE_DOUBLE_BIG: FloatFormat = FloatFormat {
    name: "ieee_double_big",
    byte_order: ByteOrder::Big,
    total_bits: 64,
    sign_bit: 0,
    exponent_start: 1,
    exponent_length: 11,
    exponent_bias: 1023,
    exponent_nan: 2047,
    mantissa_start: 12,
    mantissa_length: 52,
    integer_bit: IntegerBit::Implicit,
    identity: FormatIdentity::Native(NativeKind::Double),
};

pub static IEEE_DOUBLE_LITTLE: FloatFormat = FloatFormat {
    name: "ieee_double_little",
    byte_order: ByteOrder::Little,
    total_bits: 64,
    sign_bit: 0,
    exponent_start: 1,
    exponent_length: 11,
    exponent_bias: 1023,
    exponent_nan: 2047,
    mantissa_start: 12,
    mantissa_length: 52,
    integer_bit: IntegerBit::Implicit,
    identity: FormatIdentity::Native(NativeKind::Double),
};

// The double layout of the old ARM FPA: little-endian bytes inside
// big-endian word order. Word-swapped, so it always runs the generic path.
pub static IEEE_DOUBLE_LITTLEBYTE_BIGWORD: FloatFormat = FloatFormat {
    name: "ieee_double_littlebyte_bigword",
    byte_order: ByteOrder::LittleByteBigWord,
    total_bits: 64,
    sign_bit: 0,
    exponent_start: 1,
    exponent_length: 11,
    exponent_bias: 1023,
    exponent_nan: 2047,
    mantissa_start: 12,
    mantissa_length: 52,
    integer_bit: IntegerBit::Implicit,
    identity: FormatIdentity::Generic,
};

pub static IEEE_QUAD_BIG: FloatFormat = FloatFormat {
    name: "ieee_quad_big",
    byte_order: ByteOrder::Big,
    total_bits: 128,
    sign_bit: 0,
    exponent_start: 1,
    exponent_length: 15,
    exponent_bias: 16383,
    exponent_nan: 0x7fff,
    mantissa_start: 16,
    mantissa_length: 112,
    integer_bit: IntegerBit::Implicit,
    identity: FormatIdentity::Generic,
};

pub static IEEE_QUAD_LITTLE: FloatFormat = FloatFormat {
    name: "ieee_quad_little",
    byte_order: ByteOrder::Little,
    total_bits: 128,
    sign_bit: 0,
    exponent_start: 1,
    exponent_length: 15,
    exponent_bias: 16383,
    exponent_nan: 0x7fff,
    mantissa_start: 16,
    mantissa_length: 112,
    integer_bit: IntegerBit::Implicit,
    identity: FormatIdentity::Generic,
};

// x87 80-bit extended: the integer bit is stored, not implied.
pub static I387_EXT: FloatFormat = FloatFormat {
    name: "i387_ext",
    byte_order: ByteOrder::Little,
    total_bits: 80,
    sign_bit: 0,
    exponent_start: 1,
    exponent_length: 15,
    exponent_bias: 16383,
    exponent_nan: 0x7fff,
    mantissa_start: 16,
    mantissa_length: 64,
    integer_bit: IntegerBit::Explicit,
    identity: FormatIdentity::Generic,
};

// m68881 96-bit extended; bits 16..32 are unused padding.
pub static M68881_EXT: FloatFormat = FloatFormat {
    name: "m68881_ext",
    byte_order: ByteOrder::Big,
    total_bits: 96,
    sign_bit: 0,
    exponent_start: 1,
    exponent_length: 15,
    exponent_bias: 16383,
    exponent_nan: 0x7fff,
    mantissa_start: 32,
    mantissa_length: 64,
    integer_bit: IntegerBit::Explicit,
    identity: FormatIdentity::Generic,
};

// ARM 96-bit extended as the FPA stores it; bits 1..17 are unused, so the
// exponent starts at bit 17.
pub static ARM_EXT_LITTLEBYTE_BIGWORD: FloatFormat = FloatFormat {
    name: "arm_ext_littlebyte_bigword",
    byte_order: ByteOrder::LittleByteBigWord,
    total_bits: 96,
    sign_bit: 0,
    exponent_start: 17,
    exponent_length: 15,
    exponent_bias: 16383,
    exponent_nan: 0x7fff,
    mantissa_start: 32,
    mantissa_length: 64,
    integer_bit: IntegerBit::Explicit,
    identity: FormatIdentity::Generic,
};

// IA-64 register spill layout: 17-bit exponent, stored integer bit, the
// top 46 bits of the 128-bit slot unused.
pub static IA64_SPILL_BIG: FloatFormat = FloatFormat {
    name: "ia64_spill_big",
    byte_order: ByteOrder::Big,
    total_bits: 128,
    sign_bit: 0,
    exponent_start: 1,
    exponent_length: 17,
    exponent_bias: 65535,
    exponent_nan: 0x1ffff,
    mantissa_start: 18,
    mantissa_length: 64,
    integer_bit: IntegerBit::Explicit,
    identity: FormatIdentity::Generic,
};

pub static IA64_SPILL_LITTLE: FloatFormat = FloatFormat {
    name: "ia64_spill_little",
    byte_order: ByteOrder::Little,
    total_bits: 128,
    sign_bit: 0,
    exponent_start: 1,
    exponent_length: 17,
    exponent_bias: 65535,
    exponent_nan: 0x1ffff,
    mantissa_start: 18,
    mantissa_length: 64,
    integer_bit: IntegerBit::Explicit,
    identity: FormatIdentity::Generic,
};

// The VAX formats have no reserved exponent at all: no NaN, no infinity,
// no subnormals. exponent_nan = 0 encodes exactly that.
pub static VAX_F: FloatFormat = FloatFormat {
    name: "vax_f",
    byte_order: ByteOrder::VaxMiddle,
    total_bits: 32,
    sign_bit: 0,
    exponent_start: 1,
    exponent_length: 8,
    exponent_bias: 129,
    exponent_nan: 0,
    mantissa_start: 9,
    mantissa_length: 23,
    integer_bit: IntegerBit::Implicit,
    identity: FormatIdentity::Generic,
};

pub static VAX_D: FloatFormat = FloatFormat {
    name: "vax_d",
    byte_order: ByteOrder::VaxMiddle,
    total_bits: 64,
    sign_bit: 0,
    exponent_start: 1,
    exponent_length: 8,
    exponent_bias: 129,
    exponent_nan: 0,
    mantissa_start: 9,
    mantissa_length: 55,
    integer_bit: IntegerBit::Implicit,
    identity: FormatIdentity::Generic,
};

pub static VAX_G: FloatFormat = FloatFormat {
    name: "vax_g",
    byte_order: ByteOrder::VaxMiddle,
    total_bits: 64,
    sign_bit: 0,
    exponent_start: 1,
    exponent_length: 11,
    exponent_bias: 1025,
    exponent_nan: 0,
    mantissa_start: 12,
    mantissa_length: 52,
    integer_bit: IntegerBit::Implicit,
    identity: FormatIdentity::Generic,
};

// Every catalog entry, for table-driven checks and callers that want to
// search by name.
pub static ALL: [&FloatFormat; 17] = [
    &IEEE_HALF_BIG,
    &IEEE_HALF_LITTLE,
    &IEEE_SINGLE_BIG,
    &IEEE_SINGLE_LITTLE,
    &IEEE_DOUBLE_BIG,
    &IEEE_DOUBLE_LITTLE,
    &IEEE_DOUBLE_LITTLEBYTE_BIGWORD,
    &IEEE_QUAD_BIG,
    &IEEE_QUAD_LITTLE,
    &I387_EXT,
    &M68881_EXT,
    &ARM_EXT_LITTLEBYTE_BIGWORD,
    &IA64_SPILL_BIG,
    &IA64_SPILL_LITTLE,
    &VAX_F,
    &VAX_D,
    &VAX_G,
];

pub fn lookup_by_name(name: &str) -> Option<&'static FloatFormat> {
    ALL.iter().find(|fmt| fmt.name == name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_is_well_formed() {
        let mut names = HashSet::new();
        for fmt in ALL {
            fmt.validate();
            assert!(names.insert(fmt.name), "duplicate name {}", fmt.name);
        }
    }

    #[test]
    fn test_lookup_by_name() {
        assert!(std::ptr::eq(
            lookup_by_name("ieee_single_big").unwrap(),
            &IEEE_SINGLE_BIG
        ));
        assert!(lookup_by_name("pdp11_f").is_none());
    }

    #[test]
    fn test_native_tags_cover_the_host_layouts() {
        for fmt in [&IEEE_HALF_BIG, &IEEE_HALF_LITTLE] {
            assert_eq!(fmt.identity, FormatIdentity::Native(NativeKind::Half));
        }
        for fmt in [&IEEE_SINGLE_BIG, &IEEE_SINGLE_LITTLE] {
            assert_eq!(fmt.identity, FormatIdentity::Native(NativeKind::Single));
        }
        for fmt in [&IEEE_DOUBLE_BIG, &IEEE_DOUBLE_LITTLE] {
            assert_eq!(fmt.identity, FormatIdentity::Native(NativeKind::Double));
        }
        // Word-swapped layouts can never be reinterpreted directly.
        assert_eq!(
            IEEE_DOUBLE_LITTLEBYTE_BIGWORD.identity,
            FormatIdentity::Generic
        );
    }

    #[test]
    fn test_spot_decodes() {
        assert_eq!(IEEE_HALF_BIG.decode(&[0x3c, 0x00]), 1.0);
        assert_eq!(IEEE_HALF_LITTLE.decode(&[0x00, 0x3c]), 1.0);
        assert_eq!(
            IEEE_DOUBLE_BIG.decode(&[0x3f, 0xf0, 0, 0, 0, 0, 0, 0]),
            1.0
        );
        assert_eq!(
            IEEE_QUAD_LITTLE.decode(&[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0x3f]),
            1.0
        );
    }
}
