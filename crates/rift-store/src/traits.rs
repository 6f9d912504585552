use rift_types::ObjectId;

use crate::error::StoreResult;
use crate::object::StoredObject;

/// Content-addressed object store, as seen by the diff core.
///
/// Objects are immutable once written, so a store shared between threads
/// only ever serves reads of settled data.
pub trait ObjectStore: Send + Sync {
    /// Look an object up by identifier; `Ok(None)` when it is absent.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Store an object under its content identifier and return that
    /// identifier. Writing an existing object changes nothing.
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.read(id)?.is_some())
    }
}
