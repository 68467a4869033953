use core::fmt;
use core::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};

use crate::codec::{Codec, PostcardCodec};
use crate::dtm::{decode_dtm, encode_dtm, size_dtm, Dtm};
use crate::error::CodecError;

/// Data type support: a codec for `T` bound to the DTM of its wire format.
///
/// Encoding writes `[DTM prefix][payload]`; [`decode`](Self::decode) checks
/// the prefix before reading the payload, while
/// [`decode_data`](Self::decode_data) expects the prefix to be consumed
/// already.
///
/// # Example
///
/// ```
/// use dvs::DataTypeSupport;
///
/// const TEMPERATURE_V1: dvs::Dtm = 0;
/// let dts = DataTypeSupport::<i64>::postcard(TEMPERATURE_V1);
///
/// let mut buf = vec![0; dts.size(&21).unwrap()];
/// let n = dts.encode(&21, &mut buf).unwrap();
/// assert_eq!(&buf[..n], &[0, 42]);
/// assert_eq!(dts.decode(&buf).unwrap(), (21, 2));
/// ```
pub struct DataTypeSupport<T, C = PostcardCodec<T>> {
    dtm: Dtm,
    codec: C,
    _marker: PhantomData<fn() -> T>,
}

impl<T, C> DataTypeSupport<T, C> {
    pub const fn new(dtm: Dtm, codec: C) -> Self {
        Self {
            dtm,
            codec,
            _marker: PhantomData,
        }
    }

    /// The DTM this type is written with.
    pub fn dtm(&self) -> Dtm {
        self.dtm
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }
}

impl<T: Serialize + DeserializeOwned> DataTypeSupport<T> {
    /// Data type support using [`PostcardCodec`].
    pub const fn postcard(dtm: Dtm) -> Self {
        Self::new(dtm, PostcardCodec::new())
    }
}

impl<T, C: Codec<T>> DataTypeSupport<T, C> {
    /// Write the DTM prefix and `value` at the start of `buf`.
    pub fn encode(&self, value: &T, buf: &mut [u8]) -> Result<usize, CodecError> {
        let n = encode_dtm(self.dtm, buf)?;
        Ok(n + self.codec.encode(value, &mut buf[n..])?)
    }

    /// Exact size of prefix plus payload.
    pub fn size(&self, value: &T) -> Result<usize, CodecError> {
        Ok(size_dtm(self.dtm) + self.codec.size(value)?)
    }

    /// Read a prefixed record, failing with [`CodecError::WrongDtm`] if it
    /// was written with another DTM.
    pub fn decode(&self, bytes: &[u8]) -> Result<(T, usize), CodecError> {
        let (found, n) = decode_dtm(bytes)?;
        if found != self.dtm {
            return Err(CodecError::WrongDtm {
                expected: self.dtm,
                found,
            });
        }
        let (value, m) = self.decode_data(&bytes[n..])?;
        Ok((value, n + m))
    }

    /// Read the payload only.
    pub fn decode_data(&self, bytes: &[u8]) -> Result<(T, usize), CodecError> {
        self.codec.decode(bytes)
    }
}

impl<T, C: Clone> Clone for DataTypeSupport<T, C> {
    fn clone(&self) -> Self {
        Self::new(self.dtm, self.codec.clone())
    }
}

impl<T, C: fmt::Debug> fmt::Debug for DataTypeSupport<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataTypeSupport")
            .field("dtm", &self.dtm)
            .field("codec", &self.codec)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        num: i64,
    }

    #[test]
    fn encode_writes_prefix_then_payload() {
        let dts = DataTypeSupport::<Sample>::postcard(3);
        let mut buf = [0; 8];
        let n = dts.encode(&Sample { num: 11 }, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[6, 22]);
        assert_eq!(dts.size(&Sample { num: 11 }), Ok(n));
    }

    #[test]
    fn decode_checks_dtm() {
        let v1 = DataTypeSupport::<Sample>::postcard(0);
        let v2 = DataTypeSupport::<Sample>::postcard(1);
        let mut buf = [0; 8];
        let n = v1.encode(&Sample { num: 1 }, &mut buf).unwrap();

        assert_eq!(v1.decode(&buf[..n]), Ok((Sample { num: 1 }, n)));
        assert_eq!(
            v2.decode(&buf[..n]),
            Err(CodecError::WrongDtm {
                expected: 1,
                found: 0
            })
        );
    }

    #[test]
    fn decode_data_skips_prefix_check() {
        let dts = DataTypeSupport::<Sample>::postcard(7);
        assert_eq!(dts.decode_data(&[22]), Ok((Sample { num: 11 }, 1)));
    }

    #[test]
    fn encode_short_buffer() {
        let dts = DataTypeSupport::<Sample>::postcard(0);
        assert_eq!(
            dts.encode(&Sample { num: 1 }, &mut []),
            Err(CodecError::BufferTooSmall)
        );
        // Room for the prefix but not the payload.
        assert_eq!(
            dts.encode(&Sample { num: 1 }, &mut [0]),
            Err(CodecError::BufferTooSmall)
        );
    }
}
