//! # dvs
//!
//! Data versioning for binary codecs.
//!
//! Records are written as `[DTM][payload]`, where the DTM (data type marker)
//! names the exact wire format of the payload. Code that has moved on to a
//! newer in-memory type can still read every format it ever wrote, and can
//! write any of them back for older readers.
//!
//! ## How It Works
//!
//! 1. Each historical wire format `T` of a current type `V` is described by a
//!    [`Version`]: a codec for `T` bound to its DTM, plus migrations `T → V`
//!    and `V → T`.
//! 2. All versions go into one [`Registry`], at the index equal to their DTM.
//! 3. A [`VersionedCodec<V, E>`](VersionedCodec) encodes a `V` as any
//!    registered version and decodes any registered version into a `V`.
//!
//! ## Example
//!
//! ```
//! use dvs::{DataTypeSupport, Dtm, Registry, Version, VersionedCodec};
//! use serde::{Deserialize, Serialize};
//!
//! const ITEM_V1: Dtm = 0;
//! const ITEM_V2: Dtm = 1;
//!
//! #[derive(Serialize, Deserialize)]
//! struct ItemV1 {
//!     num: i64,
//! }
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct Item {
//!     num: i64,
//!     str: String,
//! }
//!
//! let registry = Registry::new([
//!     Version::<ItemV1, Item, ()>::new(
//!         DataTypeSupport::postcard(ITEM_V1),
//!         |old| Ok(Item { num: old.num, str: "undefined".into() }),
//!         |item| Ok(ItemV1 { num: item.num }),
//!     )
//!     .into(),
//!     Version::<Item, Item, ()>::identity(DataTypeSupport::postcard(ITEM_V2)).into(),
//! ]);
//!
//! let items = VersionedCodec::<Item, ()>::new(&registry);
//! let item = Item { num: 5, str: "hello".into() };
//!
//! // Write for a reader that only knows v1.
//! let (bs, n) = items.encode_fresh(ITEM_V1, &item).unwrap();
//! assert_eq!(&bs[..n], &[0, 10]);
//!
//! let (dtm, decoded, _) = items.decode(&bs).unwrap();
//! assert_eq!(dtm, ITEM_V1);
//! assert_eq!(decoded, Item { num: 5, str: "undefined".into() });
//! ```
//!
//! ## Reusing buffers
//!
//! [`VersionedCodec::encode_reliably`] writes into a caller-supplied buffer
//! without sizing the value first. Only when the buffer turns out to be too
//! small does it size the value and allocate a replacement, so a scratch
//! buffer that is usually large enough costs a single pass per record.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod codec;
mod dtm;
mod dts;
mod error;
mod registry;
mod version;
mod versioned;

pub use codec::{Codec, FnCodec, PostcardCodec};
pub use dtm::{decode_dtm, encode_dtm, size_dtm, Dtm, MAX_DTM_SIZE};
pub use dts::DataTypeSupport;
pub use error::{CodecError, DecodeFailure, DvsError, UnknownDtm};
pub use registry::{Registry, TypeVersion};
pub use version::{MigrateDown, MigrateUp, MigrationVersion, Version};
pub use versioned::VersionedCodec;
