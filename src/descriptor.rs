// Descriptors for binary floating point layouts.
//
// A FloatFormat records where the sign, biased exponent and mantissa of a
// target format live inside a fixed-width run of bytes, which byte ordering
// convention the bytes use, and whether the leading mantissa bit is stored
// or implied. Descriptors are plain constant data: the codec borrows them
// read-only for the duration of one call and keeps no state between calls.

// Widest format the codec accepts. Wider layouts must be rejected up front
// rather than overflowing the fixed scratch buffers used for byte-order
// normalization.
pub const MAX_TOTAL_BITS: usize = 128;

pub(crate) const MAX_TOTAL_BYTES: usize = MAX_TOTAL_BITS / 8;

// Byte ordering conventions. Only Big and Little are canonical; the two
// word-swapped orders are rewritten to Big before any field extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
    // VAX order: within each 4-byte word, the two 16-bit halves are
    // big-endian words but the bytes inside each half are swapped.
    VaxMiddle,
    // Little-endian bytes inside big-endian 4-byte words (ARM FPA doubles).
    LittleByteBigWord,
}

impl ByteOrder {
    pub fn is_canonical(self) -> bool {
        match self {
            ByteOrder::Big | ByteOrder::Little => true,
            ByteOrder::VaxMiddle | ByteOrder::LittleByteBigWord => false,
        }
    }

    // The order a buffer in this convention has after normalization. The
    // word-swapped conventions both normalize to Big.
    pub fn canonical(self) -> ByteOrder {
        match self {
            ByteOrder::Little => ByteOrder::Little,
            _ => ByteOrder::Big,
        }
    }
}

// Whether the leading mantissa bit of a normal value is physically stored
// (i387 extended) or implied by a nonzero exponent (the IEEE formats).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerBit {
    Explicit,
    Implicit,
}

// Host types a target layout can be bit-identical to. Formats tagged with
// one of these take a reinterpret fast path instead of field arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeKind {
    Half,
    Single,
    Double,
}

impl NativeKind {
    pub fn total_bits(self) -> usize {
        match self {
            NativeKind::Half => 16,
            NativeKind::Single => 32,
            NativeKind::Double => 64,
        }
    }
}

// Fast-path identity tag. Two structurally identical descriptors where one
// is Generic simply diverge in speed, never in value: the Generic one runs
// the full field arithmetic and must produce the same result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatIdentity {
    Native(NativeKind),
    Generic,
}

// Bit offsets count from the most significant bit of the conceptual value
// (bit 0 = sign of every format in the catalog), independent of how the
// bytes are ordered in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatFormat {
    pub name: &'static str,
    pub byte_order: ByteOrder,
    pub total_bits: usize,
    pub sign_bit: usize,
    pub exponent_start: usize,
    pub exponent_length: usize,
    pub exponent_bias: i32,
    // Raw exponent value reserved for Infinity/NaN. Zero means the format
    // has no reserved exponent and therefore no NaN, Inf or subnormals.
    pub exponent_nan: u32,
    pub mantissa_start: usize,
    pub mantissa_length: usize,
    pub integer_bit: IntegerBit,
    pub identity: FormatIdentity,
}

impl FloatFormat {
    pub fn total_bytes(&self) -> usize {
        self.total_bits / 8
    }

    pub fn is_word_swapped(&self) -> bool {
        !self.byte_order.is_canonical()
    }

    // Descriptors are constant data supplied by the caller, so a malformed
    // one is a programming error, not a runtime condition: this panics
    // rather than returning a recoverable error. Every codec entry point
    // revalidates; the checks are a handful of integer compares.
    pub fn validate(&self) {
        assert!(
            self.total_bits % 8 == 0,
            "{}: total_bits {} is not a multiple of 8",
            self.name,
            self.total_bits,
        );
        assert!(
            self.total_bits <= MAX_TOTAL_BITS,
            "{}: total_bits {} exceeds the supported maximum of {}",
            self.name,
            self.total_bits,
            MAX_TOTAL_BITS,
        );
        assert!(
            !self.is_word_swapped() || self.total_bits % 32 == 0,
            "{}: word-swapped orders permute 4-byte words, total_bits {} \
             is not a multiple of 32",
            self.name,
            self.total_bits,
        );
        assert!(
            self.sign_bit < self.total_bits,
            "{}: sign bit out of range",
            self.name,
        );
        assert!(
            self.exponent_length >= 1 && self.exponent_length <= 32,
            "{}: exponent length {} outside the 32-bit accumulator",
            self.name,
            self.exponent_length,
        );
        assert!(
            self.exponent_start + self.exponent_length <= self.total_bits,
            "{}: exponent field out of range",
            self.name,
        );
        assert!(
            self.mantissa_start + self.mantissa_length <= self.total_bits,
            "{}: mantissa field out of range",
            self.name,
        );
        assert!(
            self.exponent_length == 32
                || u64::from(self.exponent_nan) < 1 << self.exponent_length,
            "{}: reserved exponent does not fit the exponent field",
            self.name,
        );
        if let FormatIdentity::Native(kind) = self.identity {
            assert!(
                self.byte_order.is_canonical(),
                "{}: native formats must use a canonical byte order",
                self.name,
            );
            assert!(
                self.total_bits == kind.total_bits(),
                "{}: width does not match its native kind",
                self.name,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_orders() {
        assert!(ByteOrder::Big.is_canonical());
        assert!(ByteOrder::Little.is_canonical());
        assert!(!ByteOrder::VaxMiddle.is_canonical());
        assert!(!ByteOrder::LittleByteBigWord.is_canonical());

        assert_eq!(ByteOrder::Little.canonical(), ByteOrder::Little);
        assert_eq!(ByteOrder::Big.canonical(), ByteOrder::Big);
        assert_eq!(ByteOrder::VaxMiddle.canonical(), ByteOrder::Big);
        assert_eq!(ByteOrder::LittleByteBigWord.canonical(), ByteOrder::Big);
    }

    #[test]
    #[should_panic(expected = "exceeds the supported maximum")]
    fn test_oversized_format_rejected() {
        let fmt = FloatFormat {
            name: "oversized",
            byte_order: ByteOrder::Big,
            total_bits: 256,
            sign_bit: 0,
            exponent_start: 1,
            exponent_length: 15,
            exponent_bias: 16383,
            exponent_nan: 0x7fff,
            mantissa_start: 16,
            mantissa_length: 240,
            integer_bit: IntegerBit::Implicit,
            identity: FormatIdentity::Generic,
        };
        fmt.validate();
    }

    #[test]
    #[should_panic(expected = "canonical byte order")]
    fn test_native_format_must_be_canonical() {
        let fmt = FloatFormat {
            name: "bad_native",
            byte_order: ByteOrder::VaxMiddle,
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
        fmt.validate();
    }
}
