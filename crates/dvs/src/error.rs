use alloc::string::{String, ToString};

use thiserror::Error;

use crate::dtm::Dtm;

/// Error raised by a [`Codec`](crate::Codec) or the DTM prefix codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The output buffer cannot hold the encoded value.
    ///
    /// Writers report this instead of writing past the end of the buffer.
    #[error("buffer too small for encoded value")]
    BufferTooSmall,
    /// The input ended before a complete value was read.
    #[error("unexpected end of input")]
    UnexpectedEnd,
    /// The DTM prefix does not belong to the data type being decoded.
    #[error("wrong DTM: expected {expected}, found {found}")]
    WrongDtm { expected: Dtm, found: Dtm },
    /// The bytes do not form a valid value.
    #[error("malformed data: {0}")]
    Malformed(String),
}

impl From<postcard::Error> for CodecError {
    fn from(err: postcard::Error) -> Self {
        match err {
            postcard::Error::SerializeBufferFull => Self::BufferTooSmall,
            postcard::Error::DeserializeUnexpectedEnd => Self::UnexpectedEnd,
            other => Self::Malformed(other.to_string()),
        }
    }
}

/// The DTM has no entry in the [`Registry`](crate::Registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown DTM {0}")]
pub struct UnknownDtm(pub Dtm);

/// Error returned by versioned encode and decode operations.
///
/// `E` is the error type of the registered migration functions. Collaborator
/// errors are carried as-is: a failing migration surfaces the exact `E` it
/// returned, a failing codec the exact [`CodecError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DvsError<E> {
    /// No type version is registered for the DTM.
    #[error("unknown DTM {0}")]
    UnknownDtm(Dtm),
    /// The type version registered for the DTM does not migrate to the
    /// requested current type. This is a setup fault, not a data fault.
    #[error("type version for DTM {0} is not a migration version of the requested type")]
    WrongTypeVersion(Dtm),
    /// The codec failed.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// A migration function failed.
    #[error("migration failed: {0}")]
    Migration(E),
}

impl<E> From<UnknownDtm> for DvsError<E> {
    fn from(UnknownDtm(dtm): UnknownDtm) -> Self {
        Self::UnknownDtm(dtm)
    }
}

/// Failure of [`VersionedCodec::decode`](crate::VersionedCodec::decode).
///
/// Besides the error itself, reports how far decoding got: the DTM, if the
/// prefix could be read, and the number of bytes consumed up to the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error} (after {consumed} bytes)")]
pub struct DecodeFailure<E> {
    /// DTM read from the prefix, `None` if the prefix itself was unreadable.
    pub dtm: Option<Dtm>,
    /// Bytes consumed before the failure. Payload bytes are never counted.
    pub consumed: usize,
    /// The underlying error.
    pub error: DvsError<E>,
}

impl<E> DecodeFailure<E> {
    /// Discard position information and keep the underlying error.
    pub fn into_inner(self) -> DvsError<E> {
        self.error
    }
}
