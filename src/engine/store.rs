use chrono::NaiveDate;
use dashmap::DashMap;
use ulid::Ulid;

use crate::model::{InventoryRecord, Price};

/// One night of one room type. The unit of contention: concurrent writers
/// touching different keys never block each other.
pub type NightKey = (Ulid, NaiveDate);

/// Per-(room type, date) price and remaining stock.
///
/// `conditional_decrement` is the sole mutation primitive on the live
/// booking path; the dashmap entry lock makes its read-check-write atomic
/// per key, which is exactly where concurrent reservations serialize.
pub struct InventoryStore {
    nights: DashMap<NightKey, InventoryRecord>,
}

impl Default for InventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryStore {
    pub fn new() -> Self {
        Self { nights: DashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.nights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nights.is_empty()
    }

    pub fn get(&self, room_type_id: Ulid, date: NaiveDate) -> Option<InventoryRecord> {
        self.nights.get(&(room_type_id, date)).map(|e| *e.value())
    }

    /// Insert or overwrite the record for a key. Seeding/replay only;
    /// live traffic never calls this.
    pub fn upsert(&self, room_type_id: Ulid, date: NaiveDate, price: Price, remaining: u32) {
        self.nights
            .insert((room_type_id, date), InventoryRecord { price, remaining });
    }

    /// All existing records for `room_type_id` within `[d0, d1]`, sorted by
    /// date ascending. Dates without a record are simply absent.
    pub fn read_range(
        &self,
        room_type_id: Ulid,
        d0: NaiveDate,
        d1: NaiveDate,
    ) -> Vec<(NaiveDate, InventoryRecord)> {
        std::iter::successors(Some(d0), |d| d.succ_opt())
            .take_while(|d| *d <= d1)
            .filter_map(|d| self.get(room_type_id, d).map(|rec| (d, rec)))
            .collect()
    }

    /// Decrement `remaining` by `amount` iff `remaining >= amount`, checked
    /// and applied under the entry lock. Returns whether it was applied;
    /// `false` also covers a missing record.
    pub fn conditional_decrement(&self, room_type_id: Ulid, date: NaiveDate, amount: u32) -> bool {
        match self.nights.get_mut(&(room_type_id, date)) {
            Some(mut entry) if entry.remaining >= amount => {
                entry.remaining -= amount;
                true
            }
            _ => false,
        }
    }

    /// Inverse of `conditional_decrement`, used only to roll back nights a
    /// failed multi-night request already applied. Not a cancellation path.
    pub fn credit(&self, room_type_id: Ulid, date: NaiveDate, amount: u32) {
        if let Some(mut entry) = self.nights.get_mut(&(room_type_id, date)) {
            entry.remaining += amount;
        }
    }

    /// Snapshot every record, unordered. Compaction only.
    pub fn snapshot(&self) -> Vec<(NightKey, InventoryRecord)> {
        self.nights.iter().map(|e| (*e.key(), *e.value())).collect()
    }
}
