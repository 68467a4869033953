use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use log::debug;

use crate::codec::Codec;
use crate::dtm::Dtm;
use crate::error::UnknownDtm;
use crate::version::{MigrationVersion, Version};

/// Type-erased [`Registry`] entry.
///
/// Wraps a [`MigrationVersion<V, E>`] for some current type `V` and
/// migration error `E`. Entries for unrelated types can live side by side;
/// [`downcast`](Self::downcast) recovers the typed capability set.
pub struct TypeVersion {
    inner: Box<dyn Any + Send + Sync>,
    dtm: Dtm,
    current: &'static str,
}

impl TypeVersion {
    pub fn new<V, E>(version: impl MigrationVersion<V, E> + 'static) -> Self
    where
        V: 'static,
        E: 'static,
    {
        let dtm = version.dtm();
        let version: Box<dyn MigrationVersion<V, E>> = Box::new(version);
        Self {
            inner: Box::new(version),
            dtm,
            current: core::any::type_name::<V>(),
        }
    }

    /// The entry as a migration version of `V` with errors `E`, or `None`
    /// if it was registered for another pair.
    pub fn downcast<V, E>(&self) -> Option<&dyn MigrationVersion<V, E>>
    where
        V: 'static,
        E: 'static,
    {
        self.inner
            .downcast_ref::<Box<dyn MigrationVersion<V, E>>>()
            .map(|version| &**version)
    }

    /// The DTM the wrapped version writes.
    pub fn dtm(&self) -> Dtm {
        self.dtm
    }

    /// Name of the current type this entry migrates to.
    pub fn current_type_name(&self) -> &'static str {
        self.current
    }
}

impl<T, V, E, C> From<Version<T, V, E, C>> for TypeVersion
where
    T: 'static,
    V: 'static,
    E: 'static,
    C: Codec<T> + Send + Sync + 'static,
{
    fn from(version: Version<T, V, E, C>) -> Self {
        Self::new(version)
    }
}

impl fmt::Debug for TypeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeVersion")
            .field("dtm", &self.dtm)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

/// All supported type versions, indexed by DTM.
///
/// Entry `i` serves DTM `i`, so DTMs must be assigned densely from 0. The
/// registry is immutable after construction and may be shared by any number
/// of [`VersionedCodec`](crate::VersionedCodec)s, across threads and across
/// unrelated type families.
///
/// # Example
///
/// ```
/// use dvs::{DataTypeSupport, Registry, Version};
///
/// const SCORE_V1: dvs::Dtm = 0;
///
/// let registry = Registry::new([
///     Version::<i64, i64, ()>::identity(DataTypeSupport::postcard(SCORE_V1)).into(),
/// ]);
///
/// assert!(registry.get(SCORE_V1).is_ok());
/// assert!(registry.get(1).is_err());
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    versions: Vec<TypeVersion>,
}

impl Registry {
    /// Create a registry from versions ordered by DTM.
    ///
    /// # Panics
    ///
    /// Panics if the version at index `i` does not write DTM `i`.
    pub fn new(versions: impl IntoIterator<Item = TypeVersion>) -> Self {
        let versions: Vec<TypeVersion> = versions.into_iter().collect();
        for (i, version) in versions.iter().enumerate() {
            assert!(
                usize::try_from(version.dtm) == Ok(i),
                "type version for {} writes DTM {} but is registered at DTM {i}",
                version.current,
                version.dtm
            );
        }
        debug!("registry created with {} type versions", versions.len());
        Self { versions }
    }

    /// The type version registered for `dtm`.
    pub fn get(&self, dtm: Dtm) -> Result<&TypeVersion, UnknownDtm> {
        usize::try_from(dtm)
            .ok()
            .and_then(|i| self.versions.get(i))
            .ok_or_else(|| {
                debug!("DTM {dtm} not in registry of {}", self.versions.len());
                UnknownDtm(dtm)
            })
    }

    pub fn contains(&self, dtm: Dtm) -> bool {
        self.get(dtm).is_ok()
    }

    /// Number of registered versions.
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

impl FromIterator<TypeVersion> for Registry {
    fn from_iter<I: IntoIterator<Item = TypeVersion>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dts::DataTypeSupport;
    use alloc::vec;

    fn registry() -> Registry {
        Registry::new(vec![
            Version::<i64, i64, ()>::identity(DataTypeSupport::postcard(0)).into(),
            Version::<i32, i64, ()>::new(
                DataTypeSupport::postcard(1),
                |t| Ok(i64::from(t)),
                |v| i32::try_from(*v).map_err(|_| ()),
            )
            .into(),
        ])
    }

    #[test]
    fn get_returns_type_version() {
        let reg = registry();
        assert!(reg.get(0).unwrap().downcast::<i64, ()>().is_some());
        assert!(reg.get(1).unwrap().downcast::<i64, ()>().is_some());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn get_rejects_too_big_dtm() {
        let reg = registry();
        assert_eq!(reg.get(2).unwrap_err(), UnknownDtm(2));
        assert_eq!(reg.get(5).unwrap_err(), UnknownDtm(5));
        assert!(!reg.contains(Dtm::MAX));
    }

    #[test]
    fn get_rejects_negative_dtm() {
        let reg = registry();
        assert_eq!(reg.get(-1).unwrap_err(), UnknownDtm(-1));
        assert_eq!(reg.get(Dtm::MIN).unwrap_err(), UnknownDtm(Dtm::MIN));
    }

    #[test]
    fn empty_registry() {
        let reg = Registry::default();
        assert!(reg.is_empty());
        assert_eq!(reg.get(0).unwrap_err(), UnknownDtm(0));
    }

    #[test]
    fn downcast_rejects_other_types() {
        let reg = registry();
        let entry = reg.get(0).unwrap();
        assert!(entry.downcast::<i32, ()>().is_none());
        assert!(entry.downcast::<i64, u8>().is_none());
        assert_eq!(entry.current_type_name(), "i64");
    }

    #[test]
    fn collects_from_iterator() {
        let reg: Registry = (0..4)
            .map(|dtm| {
                let version = Version::<i64, i64, ()>::identity(DataTypeSupport::postcard(dtm));
                TypeVersion::from(version)
            })
            .collect();
        assert_eq!(reg.len(), 4);
        assert!(reg.contains(3));
    }

    #[test]
    fn registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }

    #[test]
    #[should_panic(expected = "writes DTM 0 but is registered at DTM 1")]
    fn new_rejects_misplaced_version() {
        Registry::new(vec![
            Version::<i64, i64, ()>::identity(DataTypeSupport::postcard(0)).into(),
            Version::<i64, i64, ()>::identity(DataTypeSupport::postcard(0)).into(),
        ]);
    }

    #[test]
    fn entries_know_their_dtm() {
        let reg = registry();
        assert_eq!(reg.get(0).unwrap().dtm(), 0);
        assert_eq!(reg.get(1).unwrap().dtm(), 1);
    }
}
