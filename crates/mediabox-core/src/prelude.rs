//! Convenient re-exports for common use.

pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::filter::{Condition, FilterInput, Operator, Predicate};
pub use crate::storage::{MediaStorage, SharedStorage};
pub use crate::store::{MediaStore, SharedStore};
pub use crate::types::{MediaBox, MediaContent, NewMediaBox, NewMediaContent};
pub use crate::{AddressCodec, MediaBoxConfig, RelationMode};
