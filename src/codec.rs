// Conversion between target floating point formats and host floats.
//
// Decoding rebuilds an f64 from the target's sign/exponent/mantissa fields;
// encoding decomposes an f64 and writes it into the target's bit layout.
// Formats bit-identical to a host-representable type bypass the field
// arithmetic entirely and reinterpret the raw bytes, which is what keeps
// those conversions exact for every bit pattern, NaN payloads included.
// Everything else runs through the generic path, where the two documented
// lossy cases apply: NaN payloads are reduced to their class, and mantissas
// wider than the host's carry only as much precision as an f64 holds.
//
// All routines are pure functions over borrowed descriptors and buffers;
// the only working storage is a fixed stack scratch for byte-order
// normalization.

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use half::f16;
use log::trace;

use crate::bitfield::{read_field, write_field};
use crate::descriptor::{
    ByteOrder, FloatFormat, FormatIdentity, IntegerBit, NativeKind, MAX_TOTAL_BYTES,
};

// Classification of an encoded target value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatKind {
    Zero,
    Normal,
    Subnormal,
    Infinite,
    Nan,
}

// Mantissas are moved through a 32-bit accumulator; wider fields go in
// chunks. The chunked loops are what let a 64- or 112-bit mantissa reach
// full host precision without a wider integer type.
const CHUNK_BITS: usize = 32;

// 2^exponent for exponents in the normal f64 range, built from the bit
// pattern directly so the result is exact.
fn pow2(exponent: i32) -> f64 {
    debug_assert!((-1022..=1023).contains(&exponent));
    f64::from_bits(((exponent + 1023) as u64) << 52)
}

// value * 2^exponent. Scaling steps through the representable range so an
// intermediate cannot overflow or underflow before the final result does;
// results outside the host range saturate to infinity or flush to zero.
fn ldexp(value: f64, exponent: i64) -> f64 {
    let mut value = value;
    let mut exponent = exponent;
    while exponent > 1023 {
        value *= pow2(1023);
        exponent -= 1023;
    }
    while exponent < -1022 {
        value *= pow2(-1022);
        exponent += 1022;
    }
    value * pow2(exponent as i32)
}

// Decompose a finite positive value as fraction * 2^exponent with the
// fraction in [0.5, 1.0). Subnormal inputs are renormalized by scaling
// before the exponent is read out of the bit pattern.
fn frexp(value: f64) -> (f64, i64) {
    debug_assert!(value > 0.0 && value.is_finite());

    let mut value = value;
    let mut adjust = 0i64;
    if value.to_bits() >> 52 == 0 {
        value *= pow2(64);
        adjust = -64;
    }

    let bits = value.to_bits();
    let raw = ((bits >> 52) & 0x7ff) as i64;
    let fraction = f64::from_bits((bits & !(0x7ffu64 << 52)) | (1022u64 << 52));
    (fraction, raw - 1022 + adjust)
}

// Rewrite 4-byte words between a word-swapped order and canonical big
// endian. Both permutations are involutions, so the encoder applies the
// same rewrite to turn a canonical buffer back into the declared order.
fn permute_words(order: ByteOrder, src: &[u8], dst: &mut [u8]) {
    debug_assert_eq!(src.len() % 4, 0);
    debug_assert_eq!(src.len(), dst.len());

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        match order {
            // Swap the bytes inside each 16-bit half.
            ByteOrder::VaxMiddle => {
                d[0] = s[1];
                d[1] = s[0];
                d[2] = s[3];
                d[3] = s[2];
            }
            // Reverse each word outright.
            ByteOrder::LittleByteBigWord => {
                d[0] = s[3];
                d[1] = s[2];
                d[2] = s[1];
                d[3] = s[0];
            }
            ByteOrder::Big | ByteOrder::Little => {
                unreachable!("canonical orders are never permuted")
            }
        }
    }
}

fn decode_native(kind: NativeKind, order: ByteOrder, bytes: &[u8]) -> f64 {
    match (kind, order) {
        (NativeKind::Half, ByteOrder::Big) => f16::from_bits(BigEndian::read_u16(bytes)).to_f64(),
        (NativeKind::Half, _) => f16::from_bits(LittleEndian::read_u16(bytes)).to_f64(),
        (NativeKind::Single, ByteOrder::Big) => f64::from(BigEndian::read_f32(bytes)),
        (NativeKind::Single, _) => f64::from(LittleEndian::read_f32(bytes)),
        (NativeKind::Double, ByteOrder::Big) => BigEndian::read_f64(bytes),
        (NativeKind::Double, _) => LittleEndian::read_f64(bytes),
    }
}

fn encode_native(kind: NativeKind, order: ByteOrder, value: f64, dest: &mut [u8]) {
    match (kind, order) {
        (NativeKind::Half, ByteOrder::Big) => {
            BigEndian::write_u16(dest, f16::from_f64(value).to_bits())
        }
        (NativeKind::Half, _) => LittleEndian::write_u16(dest, f16::from_f64(value).to_bits()),
        (NativeKind::Single, ByteOrder::Big) => BigEndian::write_f32(dest, value as f32),
        (NativeKind::Single, _) => LittleEndian::write_f32(dest, value as f32),
        (NativeKind::Double, ByteOrder::Big) => BigEndian::write_f64(dest, value),
        (NativeKind::Double, _) => LittleEndian::write_f64(dest, value),
    }
}

impl FloatFormat {
    fn check_buffer(&self, len: usize) {
        self.validate();
        assert!(
            len == self.total_bytes(),
            "{}: buffer is {} bytes, format needs {}",
            self.name,
            len,
            self.total_bytes(),
        );
    }

    // Bring the source bytes into a canonical order. Word-swapped buffers
    // are copied into the scratch; canonical ones are borrowed unchanged.
    // Caller-visible memory is never mutated.
    fn normalize<'a>(
        &self,
        bytes: &'a [u8],
        scratch: &'a mut [u8; MAX_TOTAL_BYTES],
    ) -> (ByteOrder, &'a [u8]) {
        if self.byte_order.is_canonical() {
            return (self.byte_order, bytes);
        }

        trace!("normalizing {} bytes from {:?}", self.name, self.byte_order);
        let n = self.total_bytes();
        permute_words(self.byte_order, bytes, &mut scratch[..n]);
        (ByteOrder::Big, &scratch[..n])
    }

    fn classify_bits(&self, order: ByteOrder, data: &[u8]) -> FloatKind {
        let exponent = read_field(
            data,
            order,
            self.total_bits,
            self.exponent_start,
            self.exponent_length,
        );

        let mut mantissa_zero = true;
        let mut offset = self.mantissa_start;
        let mut left = self.mantissa_length;
        while left > 0 {
            let chunk = left.min(CHUNK_BITS);
            let mut mantissa = read_field(data, order, self.total_bits, offset, chunk);

            // A stored integer bit is not a "nonzero fraction" signal.
            if offset == self.mantissa_start && self.integer_bit == IntegerBit::Explicit {
                mantissa &= !(1u32 << (chunk - 1));
            }

            if mantissa != 0 {
                mantissa_zero = false;
                break;
            }
            offset += chunk;
            left -= chunk;
        }

        // No reserved exponent means no subnormals, infinities or NaNs.
        if self.exponent_nan == 0 {
            return if mantissa_zero {
                FloatKind::Zero
            } else {
                FloatKind::Normal
            };
        }

        if exponent == 0 && !mantissa_zero {
            return FloatKind::Subnormal;
        }
        if exponent == self.exponent_nan {
            return if mantissa_zero {
                FloatKind::Infinite
            } else {
                FloatKind::Nan
            };
        }
        if mantissa_zero {
            FloatKind::Zero
        } else {
            FloatKind::Normal
        }
    }

    pub fn classify(&self, bytes: &[u8]) -> FloatKind {
        self.check_buffer(bytes.len());

        let mut scratch = [0u8; MAX_TOTAL_BYTES];
        let (order, data) = self.normalize(bytes, &mut scratch);
        self.classify_bits(order, data)
    }

    // Read the sign bit alone; independent of classification, so negative
    // zero and sign-carrying NaNs report faithfully.
    pub fn is_negative(&self, bytes: &[u8]) -> bool {
        self.check_buffer(bytes.len());

        let mut scratch = [0u8; MAX_TOTAL_BYTES];
        let (order, data) = self.normalize(bytes, &mut scratch);
        read_field(data, order, self.total_bits, self.sign_bit, 1) != 0
    }

    pub fn decode(&self, bytes: &[u8]) -> f64 {
        self.check_buffer(bytes.len());

        if let FormatIdentity::Native(kind) = self.identity {
            return decode_native(kind, self.byte_order, bytes);
        }
        trace!("decoding {} through the generic path", self.name);

        let mut scratch = [0u8; MAX_TOTAL_BYTES];
        let (order, data) = self.normalize(bytes, &mut scratch);
        let negative = read_field(data, order, self.total_bits, self.sign_bit, 1) != 0;

        // No portable way exists to rebuild an arbitrary payload in a host
        // NaN; only the class and the sign survive the conversion.
        match self.classify_bits(order, data) {
            FloatKind::Infinite => {
                return if negative {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                };
            }
            FloatKind::Nan => return if negative { -f64::NAN } else { f64::NAN },
            FloatKind::Zero | FloatKind::Normal | FloatKind::Subnormal => {}
        }

        let raw = read_field(
            data,
            order,
            self.total_bits,
            self.exponent_start,
            self.exponent_length,
        );

        // Subnormals store a raw exponent of zero but are weighted by the
        // minimum normal exponent, and carry no leading bit.
        let mut exponent = if raw == 0 {
            1 - i64::from(self.exponent_bias)
        } else {
            i64::from(raw) - i64::from(self.exponent_bias)
        };

        let mut result = 0.0f64;
        if raw != 0 {
            match self.integer_bit {
                // The implied leading 1 carries the value's top weight.
                IntegerBit::Implicit => result = ldexp(1.0, exponent),
                // A stored leading bit arrives as the first mantissa bit;
                // bump the working exponent so it lands on the same weight.
                IntegerBit::Explicit => exponent += 1,
            }
        }

        let mut offset = self.mantissa_start;
        let mut left = self.mantissa_length;
        while left > 0 {
            let chunk = left.min(CHUNK_BITS);
            let mantissa = read_field(data, order, self.total_bits, offset, chunk);
            result += ldexp(f64::from(mantissa), exponent - chunk as i64);
            exponent -= chunk as i64;
            offset += chunk;
            left -= chunk;
        }

        if negative {
            -result
        } else {
            result
        }
    }

    pub fn encode(&self, value: f64, dest: &mut [u8]) {
        self.check_buffer(dest.len());

        if let FormatIdentity::Native(kind) = self.identity {
            encode_native(kind, self.byte_order, value, dest);
            return;
        }
        trace!("encoding {} through the generic path", self.name);

        if self.is_word_swapped() {
            // Build canonically, then permute into the declared order.
            let n = self.total_bytes();
            let mut scratch = [0u8; MAX_TOTAL_BYTES];
            self.encode_canonical(ByteOrder::Big, value, &mut scratch[..n]);
            permute_words(self.byte_order, &scratch[..n], dest);
        } else {
            self.encode_canonical(self.byte_order, value, dest);
        }
    }

    fn encode_canonical(&self, order: ByteOrder, value: f64, out: &mut [u8]) {
        // The fields may not cover every bit of the buffer and consumers
        // reload the full width, so the unused tail must be defined too.
        for byte in out.iter_mut() {
            *byte = 0;
        }

        if value == 0.0 {
            return;
        }

        if value != value {
            write_field(
                out,
                order,
                self.total_bits,
                self.exponent_start,
                self.exponent_length,
                self.exponent_nan,
            );
            // Any nonzero mantissa separates NaN from infinity; the
            // original payload is not reproduced.
            let window = self.mantissa_length.min(CHUNK_BITS);
            write_field(out, order, self.total_bits, self.mantissa_start, window, 1);
            return;
        }

        let mut value = value;
        if value < 0.0 {
            write_field(out, order, self.total_bits, self.sign_bit, 1, 1);
            value = -value;
        }

        if value + value == value {
            // Infinity: reserved exponent, all-zero mantissa.
            write_field(
                out,
                order,
                self.total_bits,
                self.exponent_start,
                self.exponent_length,
                self.exponent_nan,
            );
            return;
        }

        let (mut fraction, exponent) = frexp(value);

        // The fraction sits in [0.5, 1.0), one position below the leading
        // bit convention, hence the adjustment by one against the bias.
        // Exponents outside the field wrap through the mask like any other
        // overflowing field write.
        write_field(
            out,
            order,
            self.total_bits,
            self.exponent_start,
            self.exponent_length,
            (exponent + i64::from(self.exponent_bias) - 1) as u32,
        );

        let mut offset = self.mantissa_start;
        let mut left = self.mantissa_length;
        while left > 0 {
            let mut chunk_bits = left.min(CHUNK_BITS);

            // Peel the next 32 fraction bits off the top.
            fraction *= 4294967296.0;
            let mut chunk = fraction as u32;
            fraction -= f64::from(chunk);

            if offset == self.mantissa_start && self.integer_bit == IntegerBit::Implicit {
                // The leading bit is implied by the exponent: discard it.
                chunk <<= 1;
                chunk_bits -= 1;
            }

            if chunk_bits < CHUNK_BITS {
                // The chunk's bits sit at the top of the accumulator.
                chunk >>= CHUNK_BITS - chunk_bits;
            }

            write_field(out, order, self.total_bits, offset, chunk_bits, chunk);
            offset += chunk_bits;
            left -= chunk_bits;
        }
    }

    // Diagnostic rendering of the mantissa field (integer bit included,
    // when stored) as lowercase hex: leading chunk unpadded, later 32-bit
    // chunks zero-filled to eight digits.
    pub fn mantissa_hex(&self, bytes: &[u8]) -> String {
        self.check_buffer(bytes.len());

        let mut scratch = [0u8; MAX_TOTAL_BYTES];
        let (order, data) = self.normalize(bytes, &mut scratch);

        if self.mantissa_length == 0 {
            return String::new();
        }

        let mut offset = self.mantissa_start;
        let mut left = self.mantissa_length;
        let first = match left % CHUNK_BITS {
            0 => CHUNK_BITS,
            bits => bits,
        };

        let mut out = format!(
            "{:x}",
            read_field(data, order, self.total_bits, offset, first)
        );
        offset += first;
        left -= first;

        while left > 0 {
            out.push_str(&format!(
                "{:08x}",
                read_field(data, order, self.total_bits, offset, CHUNK_BITS)
            ));
            offset += CHUNK_BITS;
            left -= CHUNK_BITS;
        }
        out
    }
}
