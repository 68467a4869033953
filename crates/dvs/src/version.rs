use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use log::trace;

use crate::codec::{Codec, PostcardCodec};
use crate::dtm::Dtm;
use crate::dts::DataTypeSupport;
use crate::error::{CodecError, DvsError};

/// Migrates an old data version `T` to the current version `V`.
pub type MigrateUp<T, V, E> = Box<dyn Fn(T) -> Result<V, E> + Send + Sync>;

/// Migrates the current data version `V` to an old version `T`.
pub type MigrateDown<V, T, E> = Box<dyn Fn(&V) -> Result<T, E> + Send + Sync>;

/// A type version that can be migrated to and from the current type `V`.
///
/// This is the capability set a [`Registry`](crate::Registry) entry exposes
/// once it has been resolved for `V`. Encodings produced here carry the DTM
/// prefix; `decode_and_migrate_up` expects the prefix to be consumed already.
pub trait MigrationVersion<V, E>: Send + Sync {
    /// The DTM this version's encodings are prefixed with.
    fn dtm(&self) -> Dtm;

    /// Migrate `value` down and encode it into a buffer of exactly the
    /// encoded size.
    fn migrate_down_and_encode_fresh(&self, value: &V) -> Result<(Vec<u8>, usize), DvsError<E>>;

    /// Migrate `value` down and encode it into `buf`, replacing `buf` with a
    /// fresh, exactly sized buffer only if it is too small.
    ///
    /// Callers must continue with the returned buffer; only its first
    /// `n` bytes are meaningful.
    fn migrate_down_and_encode_reliably(
        &self,
        value: &V,
        buf: Vec<u8>,
    ) -> Result<(Vec<u8>, usize), DvsError<E>>;

    /// Decode a payload and migrate it up, returning the value with the
    /// number of payload bytes consumed.
    fn decode_and_migrate_up(&self, bytes: &[u8]) -> Result<(V, usize), DvsError<E>>;
}

/// One historical version `T` of the current type `V`.
///
/// Binds `T`'s [`DataTypeSupport`] to a pair of migration functions.
///
/// # Example
///
/// ```
/// use dvs::{DataTypeSupport, MigrationVersion, Version};
///
/// // v0 stored temperatures as whole degrees, v1 stores tenths.
/// let v0 = Version::<i64, i64, ()>::new(
///     DataTypeSupport::postcard(0),
///     |degrees| Ok(degrees * 10),
///     |tenths| Ok(tenths / 10),
/// );
///
/// let (bs, n) = v0.migrate_down_and_encode_fresh(&215).unwrap();
/// assert_eq!(bs, [0, 42]);
/// assert_eq!(v0.decode_and_migrate_up(&bs[1..n]).unwrap(), (210, 1));
/// ```
pub struct Version<T, V, E, C = PostcardCodec<T>> {
    dts: DataTypeSupport<T, C>,
    migrate_up: MigrateUp<T, V, E>,
    migrate_down: MigrateDown<V, T, E>,
}

impl<T, V, E, C> Version<T, V, E, C> {
    pub fn new(
        dts: DataTypeSupport<T, C>,
        migrate_up: impl Fn(T) -> Result<V, E> + Send + Sync + 'static,
        migrate_down: impl Fn(&V) -> Result<T, E> + Send + Sync + 'static,
    ) -> Self {
        Self {
            dts,
            migrate_up: Box::new(migrate_up),
            migrate_down: Box::new(migrate_down),
        }
    }

    pub fn dts(&self) -> &DataTypeSupport<T, C> {
        &self.dts
    }
}

impl<V, E, C> Version<V, V, E, C>
where
    V: Clone + 'static,
    E: 'static,
{
    /// Version whose wire type is the current type itself.
    pub fn identity(dts: DataTypeSupport<V, C>) -> Self {
        Self::new(dts, Ok, |v: &V| Ok(v.clone()))
    }
}

impl<T, V, E, C: Codec<T>> Version<T, V, E, C> {
    fn encode_fresh(&self, t: &T) -> Result<(Vec<u8>, usize), CodecError> {
        let mut bs = vec![0; self.dts.size(t)?];
        let n = self.dts.encode(t, &mut bs)?;
        // A codec may overestimate its size; the buffer holds only the record.
        bs.truncate(n);
        Ok((bs, n))
    }
}

impl<T, V, E, C> MigrationVersion<V, E> for Version<T, V, E, C>
where
    C: Codec<T> + Send + Sync,
{
    fn dtm(&self) -> Dtm {
        self.dts.dtm()
    }

    fn migrate_down_and_encode_fresh(&self, value: &V) -> Result<(Vec<u8>, usize), DvsError<E>> {
        let t = (self.migrate_down)(value).map_err(DvsError::Migration)?;
        Ok(self.encode_fresh(&t)?)
    }

    fn migrate_down_and_encode_reliably(
        &self,
        value: &V,
        mut buf: Vec<u8>,
    ) -> Result<(Vec<u8>, usize), DvsError<E>> {
        let t = (self.migrate_down)(value).map_err(DvsError::Migration)?;
        // Write without sizing first; most callers reuse a buffer that fits.
        match self.dts.encode(&t, &mut buf) {
            Ok(n) => {
                trace!("dtm {}: encoded {n} bytes into reused buffer", self.dts.dtm());
                Ok((buf, n))
            }
            Err(CodecError::BufferTooSmall) => {
                let (bs, n) = self.encode_fresh(&t)?;
                trace!(
                    "dtm {}: buffer of {} bytes too small, allocated {n}",
                    self.dts.dtm(),
                    buf.len()
                );
                Ok((bs, n))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn decode_and_migrate_up(&self, bytes: &[u8]) -> Result<(V, usize), DvsError<E>> {
        let (t, n) = self.dts.decode_data(bytes)?;
        let v = (self.migrate_up)(t).map_err(DvsError::Migration)?;
        Ok((v, n))
    }
}

impl<T, V, E, C: fmt::Debug> fmt::Debug for Version<T, V, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Version")
            .field("dts", &self.dts)
            .field("current", &core::any::type_name::<V>())
            .finish_non_exhaustive()
    }
}
