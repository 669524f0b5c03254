//! Whole-collection codec and mutations
//!
//! Storage-independent: backends hand this module the stored bytes, apply one
//! mutation and write the re-encoded bytes back.

use crate::item::{Item, ItemId};
use crate::store::StoreError;

/// The ordered sequence of items kept under the collection key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    items: Vec<Item>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Decode stored bytes. Anything other than a JSON array of items is
    /// reported as corruption.
    pub fn decode(bytes: &[u8]) -> Result<Self, StoreError> {
        let items =
            serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Ok(Self { items })
    }

    pub fn encode(&self) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(&self.items).map_err(|e| StoreError::Encode(e.to_string()))
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// One past the highest ID present, or 1 for an empty collection.
    ///
    /// Deleting the item holding the highest ID lets that ID be handed out
    /// again. A stored ID of `ItemId::MAX` leaves no next ID and is
    /// reported as corruption.
    pub fn next_id(&self) -> Result<ItemId, StoreError> {
        match self.items.iter().map(|item| item.id).max() {
            None => Ok(1),
            Some(max) => max
                .max(0)
                .checked_add(1)
                .ok_or_else(|| StoreError::Corrupt(format!("item id {} has no successor", max))),
        }
    }

    /// Assign the next ID to `item` and append a copy of it.
    pub fn push(&mut self, item: &mut Item) -> Result<ItemId, StoreError> {
        item.id = self.next_id()?;
        self.items.push(item.clone());
        Ok(item.id)
    }

    /// Remove the item with the given ID, shifting later items left.
    pub fn remove(&mut self, id: ItemId) -> Result<Item, StoreError> {
        let index = self.position(id)?;
        Ok(self.items.remove(index))
    }

    pub fn complete(&mut self, id: ItemId) -> Result<(), StoreError> {
        let index = self.position(id)?;
        self.items[index].done = true;
        Ok(())
    }

    fn position(&self, id: ItemId) -> Result<usize, StoreError> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or(StoreError::NotFound(id))
    }
}
