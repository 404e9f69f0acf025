// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::cmp::Ordering;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::timestamp::Timestamp;

/// Opaque identifier of a reviewable item.
///
/// Ids are content-addressed: the BLAKE3 hash of the item's title and its
/// creation timestamp. The engine never looks inside them beyond equality
/// and ordering.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId {
    #[serde(skip)]
    inner: blake3::Hash,
}

impl ItemId {
    /// Derive the id for an item with this title created at this moment.
    pub fn derive(title: &str, created_at: Timestamp) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(title.as_bytes());
        // Separator, so "ab" + "c..." and "a" + "bc..." cannot collide.
        hasher.update(&[0]);
        hasher.update(created_at.to_string().as_bytes());
        Self {
            inner: hasher.finalize(),
        }
    }

    pub fn to_hex(self) -> String {
        self.inner.to_hex().to_string()
    }

    pub fn from_hex(s: &str) -> Fallible<Self> {
        let inner = blake3::Hash::from_hex(s)
            .map_err(|_| ErrorReport::invalid_input(format!("invalid item id: '{s}'")))?;
        Ok(Self { inner })
    }
}

impl PartialOrd for ItemId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ItemId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.as_bytes().cmp(other.inner.as_bytes())
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<String> for ItemId {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ItemId::from_hex(&value)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> String {
        id.to_hex()
    }
}
