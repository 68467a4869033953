use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

use log::debug;

use crate::dtm::{decode_dtm, Dtm};
use crate::error::{DecodeFailure, DvsError};
use crate::registry::Registry;
use crate::version::MigrationVersion;

/// Versioned encoding and decoding of the current type `V`.
///
/// Resolves every DTM through a shared [`Registry`] and runs the registered
/// migration for it. `E` is the error type of the migration functions. The
/// codec itself holds nothing but the registry reference, so it is `Copy`
/// and many codecs, for the same or different `V`, can share one registry.
pub struct VersionedCodec<'r, V, E> {
    registry: &'r Registry,
    _marker: PhantomData<fn(V) -> E>,
}

impl<'r, V, E> VersionedCodec<'r, V, E>
where
    V: 'static,
    E: 'static,
{
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            _marker: PhantomData,
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Migrate `value` to the version `dtm` and encode it, prefix included,
    /// into a new buffer of exactly the encoded size.
    pub fn encode_fresh(&self, dtm: Dtm, value: &V) -> Result<(Vec<u8>, usize), DvsError<E>> {
        self.version(dtm)?.migrate_down_and_encode_fresh(value)
    }

    /// Migrate `value` to the version `dtm` and encode it into `buf`.
    ///
    /// If `buf` is too small it is dropped and a new, exactly sized buffer is
    /// returned instead. Either way only the first `n` bytes of the returned
    /// buffer belong to the record.
    pub fn encode_reliably(
        &self,
        dtm: Dtm,
        value: &V,
        buf: Vec<u8>,
    ) -> Result<(Vec<u8>, usize), DvsError<E>> {
        self.version(dtm)?.migrate_down_and_encode_reliably(value, buf)
    }

    /// Decode a DTM-prefixed record and migrate it to `V`.
    ///
    /// Returns the DTM the record was written with, the migrated value, and
    /// the total number of bytes consumed (prefix plus payload). If the prefix
    /// decodes but the lookup or the payload fails, the failure reports the
    /// DTM and the prefix length as consumed. A failed migration reports the
    /// DTM with nothing consumed.
    pub fn decode(&self, bytes: &[u8]) -> Result<(Dtm, V, usize), DecodeFailure<E>> {
        let (dtm, n) = decode_dtm(bytes).map_err(|err| DecodeFailure::<E> {
            dtm: None,
            consumed: 0,
            error: DvsError::Codec(err),
        })?;
        let fail = |error: DvsError<E>| DecodeFailure {
            dtm: Some(dtm),
            consumed: n,
            error,
        };
        let version = self.version(dtm).map_err(fail)?;
        let (value, m) = version
            .decode_and_migrate_up(&bytes[n..])
            .map_err(|error| match error {
                DvsError::Migration(_) => DecodeFailure {
                    dtm: Some(dtm),
                    consumed: 0,
                    error,
                },
                error => fail(error),
            })?;
        Ok((dtm, value, n + m))
    }

    fn version(&self, dtm: Dtm) -> Result<&'r dyn MigrationVersion<V, E>, DvsError<E>> {
        let entry = self.registry.get(dtm)?;
        entry.downcast::<V, E>().ok_or_else(|| {
            debug!(
                "DTM {dtm} is registered for {}, not {}",
                entry.current_type_name(),
                core::any::type_name::<V>()
            );
            DvsError::WrongTypeVersion(dtm)
        })
    }
}

impl<V, E> Clone for VersionedCodec<'_, V, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V, E> Copy for VersionedCodec<'_, V, E> {}

impl<V, E> fmt::Debug for VersionedCodec<'_, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionedCodec")
            .field("current", &core::any::type_name::<V>())
            .field("versions", &self.registry.len())
            .finish()
    }
}
