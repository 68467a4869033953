//! DTM prefix codec.
//!
//! Every versioned record starts with its data type marker:
//!
//! ```text
//! [DTM: zigzag varint, 1..=10 bytes][PAYLOAD: N bytes]
//! ```
//!
//! The marker uses the same encoding postcard uses for signed integers, so a
//! DTM is written exactly like an `i64` field would be.

use crate::error::CodecError;

/// Data type marker: identifies one historical wire format of a type.
///
/// Once assigned, a DTM is never reused for a different format. Registered
/// DTMs are dense indices starting at 0; the type is signed so that negative
/// values read off the wire can be represented and rejected.
pub type Dtm = i64;

/// Maximum length of an encoded DTM prefix.
pub const MAX_DTM_SIZE: usize = 10;

/// Write `dtm` at the start of `buf`, returning the number of bytes written.
///
/// Fails with [`CodecError::BufferTooSmall`] if `buf` cannot hold the prefix.
pub fn encode_dtm(dtm: Dtm, buf: &mut [u8]) -> Result<usize, CodecError> {
    let used = postcard::to_slice(&dtm, buf)?;
    Ok(used.len())
}

/// Read a DTM from the front of `bytes`, returning it with the prefix length.
pub fn decode_dtm(bytes: &[u8]) -> Result<(Dtm, usize), CodecError> {
    let (dtm, rest) = postcard::take_from_bytes::<Dtm>(bytes)?;
    Ok((dtm, bytes.len() - rest.len()))
}

/// Exact number of bytes [`encode_dtm`] writes for `dtm`.
pub fn size_dtm(dtm: Dtm) -> usize {
    let mut zigzag = ((dtm << 1) ^ (dtm >> 63)) as u64;
    let mut size = 1;
    while zigzag >= 0x80 {
        zigzag >>= 7;
        size += 1;
    }
    size
}
