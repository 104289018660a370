// Bit-level field access across a byte buffer.
//
// Fields are addressed by (start, length) where bit 0 is the most
// significant bit of the conceptual value, independent of how the bytes
// are ordered in storage, so one set of offsets describes a format in both
// of its canonical incarnations. Field values are at most 32 bits wide;
// callers split wider mantissas into chunks.
//
// Word-swapped buffers must be normalized before coming anywhere near
// these routines: only the two canonical orders are accepted.

use crate::descriptor::ByteOrder;

// Locate the byte holding the field's least significant bit, and that
// bit's shift from the byte's own least significant end. Little-endian
// buffers are walked from the far end; when total_bits is not a byte
// multiple their terminal byte carries unused "excess" padding which
// offsets the whole walk.
fn lsb_position(
    order: ByteOrder,
    total_bits: usize,
    buf_len: usize,
    lsb: usize,
) -> (usize, usize) {
    match order {
        ByteOrder::Big => (lsb / 8, 7 - lsb % 8),
        ByteOrder::Little => {
            let excess = (8 - total_bits % 8) % 8;
            (buf_len - 1 - (lsb + excess) / 8, 7 - (lsb + excess) % 8)
        }
        ByteOrder::VaxMiddle | ByteOrder::LittleByteBigWord => {
            unreachable!("field access requires a canonical byte order")
        }
    }
}

// Extract `length` bits starting at bit `start`, right-justified in the
// accumulator. Walks from the least significant byte of the field toward
// the most significant, OR-ing shifted bytes in as it goes.
pub fn read_field(
    buf: &[u8],
    order: ByteOrder,
    total_bits: usize,
    start: usize,
    length: usize,
) -> u32 {
    debug_assert!(length <= 32);
    debug_assert!(start + length <= total_bits);
    debug_assert!(buf.len() * 8 >= total_bits);

    if length == 0 {
        return 0;
    }

    let step: isize = if order == ByteOrder::Little { 1 } else { -1 };
    let (mut byte, shift) = lsb_position(order, total_bits, buf.len(), start + length - 1);

    let mut result = u32::from(buf[byte] >> shift);
    let mut filled = 8 - shift;

    while filled < length {
        byte = (byte as isize + step) as usize;
        result |= u32::from(buf[byte]) << filled;
        filled += 8;
    }

    if length < 32 {
        result &= (1u32 << length) - 1;
    }
    result
}

// Mirror of read_field: deposit the low `length` bits of `value` into the
// field, leaving every other bit of the touched bytes alone. Adjacent
// fields routinely share bytes (sign and exponent, exponent and mantissa),
// so the partial bytes at both ends clear exactly the field's bits.
pub fn write_field(
    buf: &mut [u8],
    order: ByteOrder,
    total_bits: usize,
    start: usize,
    length: usize,
    value: u32,
) {
    debug_assert!(length <= 32);
    debug_assert!(start + length <= total_bits);
    debug_assert!(buf.len() * 8 >= total_bits);

    if length == 0 {
        return;
    }

    let value = if length < 32 {
        value & ((1u32 << length) - 1)
    } else {
        value
    };

    let step: isize = if order == ByteOrder::Little { 1 } else { -1 };
    let (mut byte, shift) = lsb_position(order, total_bits, buf.len(), start + length - 1);

    let low_bits = (8 - shift).min(length);
    let mask = (((1u32 << low_bits) - 1) << shift) as u8;
    buf[byte] = (buf[byte] & !mask) | ((value << shift) as u8 & mask);
    let mut written = 8 - shift;

    while written < length {
        byte = (byte as isize + step) as usize;
        let remaining = length - written;
        if remaining >= 8 {
            buf[byte] = (value >> written) as u8;
        } else {
            // Most significant partial byte: the field owns its low bits.
            let mask = (1u8 << remaining) - 1;
            buf[byte] = (buf[byte] & !mask) | ((value >> written) as u8 & mask);
        }
        written += 8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    const ORDERS: [ByteOrder; 2] = [ByteOrder::Big, ByteOrder::Little];

    // The IEEE single encoding of 1.5, in both canonical orders.
    const ONE_POINT_FIVE_BIG: [u8; 4] = [0x3f, 0xc0, 0x00, 0x00];
    const ONE_POINT_FIVE_LITTLE: [u8; 4] = [0x00, 0x00, 0xc0, 0x3f];

    #[test]
    fn test_read_known_fields() {
        for (order, buf) in [
            (ByteOrder::Big, &ONE_POINT_FIVE_BIG),
            (ByteOrder::Little, &ONE_POINT_FIVE_LITTLE),
        ] {
            assert_eq!(read_field(buf, order, 32, 0, 1), 0, "{:?} sign", order);
            assert_eq!(read_field(buf, order, 32, 1, 8), 127, "{:?} exponent", order);
            assert_eq!(
                read_field(buf, order, 32, 9, 23),
                0x400000,
                "{:?} mantissa",
                order
            );
            assert_eq!(read_field(buf, order, 32, 0, 32), 0x3fc00000, "{:?} all", order);
        }
    }

    #[test]
    fn test_zero_length_field() {
        let buf = [0xffu8; 4];
        for order in ORDERS {
            assert_eq!(read_field(&buf, order, 32, 17, 0), 0);
        }
        let mut buf = [0xffu8; 4];
        write_field(&mut buf, ByteOrder::Big, 32, 17, 0, 0x1234);
        assert_eq!(buf, [0xffu8; 4]);
    }

    #[test]
    fn test_write_known_fields() {
        for (order, expected) in [
            (ByteOrder::Big, ONE_POINT_FIVE_BIG),
            (ByteOrder::Little, ONE_POINT_FIVE_LITTLE),
        ] {
            let mut buf = [0u8; 4];
            write_field(&mut buf, order, 32, 0, 1, 0);
            write_field(&mut buf, order, 32, 1, 8, 127);
            write_field(&mut buf, order, 32, 9, 23, 0x400000);
            assert_eq!(buf, expected, "{:?}", order);
        }
    }

    #[test]
    fn test_write_preserves_shared_bytes() {
        // Sign, exponent and the mantissa's top bits all live in the first
        // two bytes of an IEEE single; rewriting one field must not
        // disturb the others.
        let mut buf = ONE_POINT_FIVE_BIG;
        write_field(&mut buf, ByteOrder::Big, 32, 0, 1, 1);
        assert_eq!(buf, [0xbf, 0xc0, 0x00, 0x00]);
        write_field(&mut buf, ByteOrder::Big, 32, 1, 8, 0);
        assert_eq!(buf, [0x80, 0x40, 0x00, 0x00]);
        write_field(&mut buf, ByteOrder::Big, 32, 9, 23, 0);
        assert_eq!(buf, [0x80, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_unaligned_total_bits() {
        // 12-bit value 0xabc: the little-endian buffer keeps its excess
        // padding in the high bits of the terminal byte.
        let big = [0xab, 0xc0];
        assert_eq!(read_field(&big, ByteOrder::Big, 12, 0, 12), 0xabc);
        assert_eq!(read_field(&big, ByteOrder::Big, 12, 4, 8), 0xbc);

        let little = [0xbc, 0x0a];
        assert_eq!(read_field(&little, ByteOrder::Little, 12, 0, 12), 0xabc);
        assert_eq!(read_field(&little, ByteOrder::Little, 12, 4, 8), 0xbc);

        let mut buf = [0u8; 2];
        write_field(&mut buf, ByteOrder::Little, 12, 0, 12, 0xabc);
        assert_eq!(buf, [0xbc, 0x0a]);
    }

    #[test]
    fn test_read_write_round_trip() {
        let mut rng = rand::thread_rng();

        for _ in 0..2000 {
            let total_bytes = rng.gen_range(1..=16usize);
            let total_bits = total_bytes * 8;
            let length = rng.gen_range(1..=32.min(total_bits));
            let start = rng.gen_range(0..=total_bits - length);
            let value: u32 = rng.gen();
            let order = ORDERS[rng.gen_range(0..2)];

            let mut buf = [0u8; 16];
            rng.fill(&mut buf[..total_bytes]);
            let before = buf;

            write_field(&mut buf[..total_bytes], order, total_bits, start, length, value);

            let mask = if length < 32 {
                (1u32 << length) - 1
            } else {
                u32::MAX
            };
            assert_eq!(
                read_field(&buf[..total_bytes], order, total_bits, start, length),
                value & mask,
                "read back (order {:?}, start {}, length {})",
                order,
                start,
                length
            );

            // Every bit outside the field is untouched.
            for bit in 0..total_bits {
                if bit >= start && bit < start + length {
                    continue;
                }
                assert_eq!(
                    read_field(&buf[..total_bytes], order, total_bits, bit, 1),
                    read_field(&before[..total_bytes], order, total_bits, bit, 1),
                    "bit {} disturbed (order {:?}, start {}, length {})",
                    bit,
                    order,
                    start,
                    length
                );
            }
        }
    }

    #[test]
    fn test_orders_agree_on_reversed_buffers() {
        // A big-endian buffer and its byte reversal are the same
        // conceptual value, so every field must read identically.
        let mut rng = rand::thread_rng();

        for _ in 0..200 {
            let total_bytes = rng.gen_range(1..=16usize);
            let total_bits = total_bytes * 8;
            let mut big = [0u8; 16];
            rng.fill(&mut big[..total_bytes]);
            let mut little = [0u8; 16];
            for i in 0..total_bytes {
                little[i] = big[total_bytes - 1 - i];
            }

            for _ in 0..32 {
                let length = rng.gen_range(1..=32.min(total_bits));
                let start = rng.gen_range(0..=total_bits - length);
                assert_eq!(
                    read_field(&big[..total_bytes], ByteOrder::Big, total_bits, start, length),
                    read_field(&little[..total_bytes], ByteOrder::Little, total_bits, start, length),
                );
            }
        }
    }
}
