use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Item identifier, assigned by the store on insertion (first item is 1).
pub type ItemId = i64;

/// A single to-do entry.
///
/// Field names on the wire are `ID`, `Body`, `Created` and `Done`. Decoding
/// also accepts lowercase names and tolerates a missing `ID` or `Done`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "ID", alias = "id", default)]
    pub id: ItemId,
    #[serde(rename = "Body", alias = "body", default)]
    pub body: String,
    #[serde(rename = "Created", alias = "created")]
    pub created: DateTime<Utc>,
    #[serde(rename = "Done", alias = "done", default)]
    pub done: bool,
}

impl Item {
    /// An unsaved item; the store assigns its ID.
    pub fn new(body: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            body: body.into(),
            created,
            done: false,
        }
    }
}

/// Payload of a JSON add request.
///
/// Clients set `Body` and usually `Created`; an `ID` or `Done` they send is
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewItem {
    #[serde(rename = "Body", alias = "body", default)]
    pub body: String,
    #[serde(rename = "Created", alias = "created", default)]
    pub created: Option<DateTime<Utc>>,
}

impl NewItem {
    /// Build the item to store, stamping it with `now` if the client left
    /// `Created` out.
    pub fn into_item(self, now: DateTime<Utc>) -> Item {
        Item::new(self.body, self.created.unwrap_or(now))
    }
}
