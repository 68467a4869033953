//! Byte-level codecs for a single historical representation.

use core::fmt;
use core::marker::PhantomData;

use postcard::ser_flavors::Size;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::CodecError;

/// Encodes, sizes, and decodes values of `T`.
///
/// `encode` must be bounds-checked: when `buf` is too short it returns
/// [`CodecError::BufferTooSmall`] rather than panicking, and leaves whatever
/// it wrote in `buf` to be discarded by the caller. This is what lets
/// [`Version`](crate::Version) write optimistically into a reused buffer.
pub trait Codec<T> {
    /// Write `value` at the start of `buf`, returning the number of bytes used.
    fn encode(&self, value: &T, buf: &mut [u8]) -> Result<usize, CodecError>;

    /// Exact number of bytes `encode` needs for `value`.
    fn size(&self, value: &T) -> Result<usize, CodecError>;

    /// Read one value from the front of `bytes`, returning it with the
    /// number of bytes consumed.
    fn decode(&self, bytes: &[u8]) -> Result<(T, usize), CodecError>;
}

/// [`Codec`] backed by postcard.
///
/// Signed integers are zigzag varints, unsigned integers plain varints, and
/// strings a varint length followed by UTF-8 bytes.
pub struct PostcardCodec<T>(PhantomData<fn() -> T>);

impl<T> PostcardCodec<T> {
    /// Create a postcard codec for `T`.
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for PostcardCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for PostcardCodec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PostcardCodec<T> {}

impl<T> fmt::Debug for PostcardCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PostcardCodec<{}>", core::any::type_name::<T>())
    }
}

impl<T: Serialize + DeserializeOwned> Codec<T> for PostcardCodec<T> {
    fn encode(&self, value: &T, buf: &mut [u8]) -> Result<usize, CodecError> {
        let used = postcard::to_slice(value, buf)?;
        Ok(used.len())
    }

    fn size(&self, value: &T) -> Result<usize, CodecError> {
        Ok(postcard::serialize_with_flavor::<T, Size, usize>(
            value,
            Size::default(),
        )?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<(T, usize), CodecError> {
        let (value, rest) = postcard::take_from_bytes::<T>(bytes)?;
        Ok((value, bytes.len() - rest.len()))
    }
}

/// [`Codec`] assembled from three plain functions, for hand-written formats.
///
/// # Example
///
/// ```
/// use dvs::{Codec, CodecError, FnCodec};
///
/// fn encode(v: &u8, buf: &mut [u8]) -> Result<usize, CodecError> {
///     *buf.first_mut().ok_or(CodecError::BufferTooSmall)? = *v;
///     Ok(1)
/// }
/// fn size(_: &u8) -> Result<usize, CodecError> {
///     Ok(1)
/// }
/// fn decode(bytes: &[u8]) -> Result<(u8, usize), CodecError> {
///     bytes.first().map(|b| (*b, 1)).ok_or(CodecError::UnexpectedEnd)
/// }
///
/// let codec = FnCodec::new(encode, size, decode);
/// let mut buf = [0; 4];
/// assert_eq!(codec.encode(&7, &mut buf), Ok(1));
/// assert_eq!(codec.decode(&buf), Ok((7, 1)));
/// assert_eq!(codec.encode(&7, &mut []), Err(CodecError::BufferTooSmall));
/// ```
pub struct FnCodec<T> {
    encode: fn(&T, &mut [u8]) -> Result<usize, CodecError>,
    size: fn(&T) -> Result<usize, CodecError>,
    decode: fn(&[u8]) -> Result<(T, usize), CodecError>,
}

impl<T> FnCodec<T> {
    pub const fn new(
        encode: fn(&T, &mut [u8]) -> Result<usize, CodecError>,
        size: fn(&T) -> Result<usize, CodecError>,
        decode: fn(&[u8]) -> Result<(T, usize), CodecError>,
    ) -> Self {
        Self {
            encode,
            size,
            decode,
        }
    }
}

impl<T> Clone for FnCodec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FnCodec<T> {}

impl<T> fmt::Debug for FnCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FnCodec<{}>", core::any::type_name::<T>())
    }
}

impl<T> Codec<T> for FnCodec<T> {
    fn encode(&self, value: &T, buf: &mut [u8]) -> Result<usize, CodecError> {
        (self.encode)(value, buf)
    }

    fn size(&self, value: &T) -> Result<usize, CodecError> {
        (self.size)(value)
    }

    fn decode(&self, bytes: &[u8]) -> Result<(T, usize), CodecError> {
        (self.decode)(bytes)
    }
}
