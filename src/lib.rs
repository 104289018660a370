//! Conversion between binary floating point formats described by bit
//! layout and the host's native floats.
//!
//! A [`FloatFormat`](descriptor::FloatFormat) declares where the sign,
//! biased exponent and mantissa of a target format live inside a run of
//! bytes, the byte ordering convention (including the two word-swapped
//! middle-endian families), and whether the leading mantissa bit is stored
//! or implied. The codec converts such buffers to and from `f64` without
//! assuming the host shares the target's representation, so a debugger or
//! emulator can read an IA-64 register spill or a VAX double off the wire
//! on any machine.
//!
//! ```
//! use floatformat::formats;
//!
//! let mut buf = [0u8; 4];
//! formats::IEEE_SINGLE_BIG.encode(1.5, &mut buf);
//! assert_eq!(buf, [0x3f, 0xc0, 0x00, 0x00]);
//! assert_eq!(formats::IEEE_SINGLE_BIG.decode(&buf), 1.5);
//! ```
//!
//! Formats bit-identical to a host type (`f16`, `f32`, `f64` in either
//! canonical byte order) are tagged in their descriptor and reinterpreted
//! directly, which keeps those conversions exact for every bit pattern.
//! Everything else runs through generic field arithmetic with two
//! documented lossy cases: NaN payloads carry over as class and sign only,
//! and mantissas wider than the host's 53 bits round to host precision.

mod bitfield;
mod codec;
pub mod descriptor;
pub mod formats;

pub use crate::codec::FloatKind;
pub use crate::descriptor::{
    ByteOrder, FloatFormat, FormatIdentity, IntegerBit, NativeKind, MAX_TOTAL_BITS,
};
