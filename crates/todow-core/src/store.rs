use crate::item::{Item, ItemId};

/// The trait that collection backends implement.
///
/// Each method is one atomic transaction against the stored collection: a
/// concurrent reader sees either the state before or after a mutation, never
/// a partial write.
pub trait CollectionStore: Send + Sync {
    /// Decode the whole collection. `Ok(None)` means nothing has been stored
    /// yet.
    fn load(&self) -> Result<Option<Vec<Item>>, StoreError>;

    /// Append an item, assigning it `max(existing IDs) + 1` (or 1). The
    /// assigned ID is written back into `item` and returned.
    fn add(&self, item: &mut Item) -> Result<ItemId, StoreError>;

    /// Delete the item with the given ID, keeping the order of the rest.
    fn remove(&self, id: ItemId) -> Result<(), StoreError>;

    /// Mark the item with the given ID as done. Completing twice is fine.
    fn complete(&self, id: ItemId) -> Result<(), StoreError>;

    /// The stored collection bytes, verbatim.
    fn all_items(&self) -> Result<Vec<u8>, StoreError>;
}

/// Errors from the collection store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("item #{0} not found")]
    NotFound(ItemId),

    #[error("no items yet")]
    NoItems,

    #[error("collection seems corrupt: {0}")]
    Corrupt(String),

    #[error("unable to encode item collection: {0}")]
    Encode(String),

    #[error("storage error: {0}")]
    Storage(String),
}
