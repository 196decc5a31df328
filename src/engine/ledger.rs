use tokio::sync::RwLock;

use crate::model::Booking;

/// Durable append-only record of confirmed bookings. Append is the only
/// mutation; durability comes from the journal, this is the in-memory
/// projection rebuilt on replay.
pub struct BookingLedger {
    bookings: RwLock<Vec<Booking>>,
}

impl Default for BookingLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingLedger {
    pub fn new() -> Self {
        Self::from_bookings(Vec::new())
    }

    /// Rebuild from journal replay, preserving append order.
    pub fn from_bookings(bookings: Vec<Booking>) -> Self {
        Self { bookings: RwLock::new(bookings) }
    }

    pub async fn append(&self, booking: Booking) {
        self.bookings.write().await.push(booking);
    }

    /// Most recent confirmed bookings, newest first.
    pub async fn list_recent(&self, limit: usize) -> Vec<Booking> {
        let bookings = self.bookings.read().await;
        bookings.iter().rev().take(limit).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.bookings.read().await.len()
    }

    /// Every booking in append order. Compaction only.
    pub async fn snapshot(&self) -> Vec<Booking> {
        self.bookings.read().await.clone()
    }
}
