use std::collections::HashMap;

use chrono::NaiveDate;
use tokio::sync::oneshot;
use tracing::info;
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::observability;

use super::{Engine, EngineError, JournalCommand};

/// A normalized booking request. Transport-level aliasing and optionality
/// are resolved before this struct is built; the engine never sees a
/// half-parsed payload.
#[derive(Debug, Clone)]
pub struct ReservationRequest {
    pub room_type_id: Ulid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub quantity: u32,
    pub guest: Guest,
}

impl ReservationRequest {
    /// Constraint-check without touching storage.
    fn validate(&self) -> Result<StayRange, EngineError> {
        if self.quantity < 1 {
            return Err(EngineError::InvalidInput("quantity must be at least 1"));
        }
        if self.quantity > MAX_QUANTITY {
            return Err(EngineError::LimitExceeded("quantity too large"));
        }
        if self.check_in >= self.check_out {
            return Err(EngineError::InvalidInput("check_out must be after check_in"));
        }
        let stay = StayRange::new(self.check_in, self.check_out);
        if stay.num_nights() > MAX_STAY_NIGHTS {
            return Err(EngineError::LimitExceeded("stay too long"));
        }
        if self.guest.name.trim().is_empty() {
            return Err(EngineError::InvalidInput("guest name is required"));
        }
        if self.guest.email.trim().is_empty() {
            return Err(EngineError::InvalidInput("guest email is required"));
        }
        for field in [Some(&self.guest.name), Some(&self.guest.email), self.guest.phone.as_ref(), self.guest.notes.as_ref()]
            .into_iter()
            .flatten()
        {
            if field.len() > MAX_GUEST_FIELD_LEN {
                return Err(EngineError::LimitExceeded("guest field too long"));
            }
        }
        Ok(stay)
    }
}

impl Engine {
    /// Reserve `quantity` rooms for every night of the stay, all or nothing.
    ///
    /// Concurrent requests for the same nights serialize at the store's
    /// per-night conditional decrement; a loser whose capacity vanished
    /// between read and write gets `SoldOutRace` after its partial
    /// decrements are credited back. No failure path leaves the inventory
    /// different from how the request found it.
    pub async fn reserve(&self, request: ReservationRequest) -> Result<Booking, EngineError> {
        let start = std::time::Instant::now();
        let result = self.reserve_inner(request).await;
        metrics::histogram!(observability::RESERVATION_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());
        metrics::counter!(
            observability::RESERVATIONS_TOTAL,
            "status" => observability::reservation_status(&result)
        )
        .increment(1);
        result
    }

    async fn reserve_inner(&self, request: ReservationRequest) -> Result<Booking, EngineError> {
        let stay = request.validate()?;
        let nights: Vec<NaiveDate> = stay.nights().collect();

        // Read phase: every night must have explicit stock. A night with no
        // record is unbookable, and an insufficient night rejects the whole
        // request; no partial fulfillment across nights.
        let mut total_price: u64 = 0;
        for &night in &nights {
            let record = self
                .inventory
                .get(request.room_type_id, night)
                .ok_or(EngineError::NoInventory)?;
            if record.remaining < request.quantity {
                return Err(EngineError::SoldOut {
                    date: night,
                    remaining: record.remaining,
                    requested: request.quantity,
                });
            }
            total_price += u64::from(record.price) * u64::from(request.quantity);
        }

        // Write phase: the guard re-checks remaining at write time, closing
        // the window between the read above and this decrement. The commit
        // gate keeps the decrement+journal+ledger sequence from interleaving
        // with a compaction snapshot.
        let _commit = self.commit_gate.read().await;
        for (applied, &night) in nights.iter().enumerate() {
            if !self
                .inventory
                .conditional_decrement(request.room_type_id, night, request.quantity)
            {
                self.rollback(request.room_type_id, &nights[..applied], request.quantity);
                return Err(EngineError::SoldOutRace { date: night });
            }
        }

        let booking = Booking {
            id: Ulid::new(),
            room_type_id: request.room_type_id,
            check_in: request.check_in,
            check_out: request.check_out,
            quantity: request.quantity,
            guest: request.guest,
            total_price,
            created_at: now_ms(),
        };
        let event = Event::BookingConfirmed { booking: booking.clone() };

        // Persistence failure must also leave the inventory untouched.
        if let Err(e) = self.journal_append(&event).await {
            self.rollback(request.room_type_id, &nights, request.quantity);
            return Err(e);
        }

        self.ledger.append(booking.clone()).await;
        // Fire-and-forget: email/chat collaborators subscribe here; their
        // failure never unwinds a committed booking.
        self.notify.send(booking.room_type_id, &event);

        info!(
            booking = %booking.id,
            room_type = %booking.room_type_id,
            nights = nights.len(),
            quantity = booking.quantity,
            "reservation confirmed"
        );
        Ok(booking)
    }

    /// Credit back nights a failed request already decremented.
    fn rollback(&self, room_type_id: Ulid, nights: &[NaiveDate], quantity: u32) {
        for &night in nights {
            self.inventory.credit(room_type_id, night, quantity);
        }
        metrics::counter!(observability::ROLLBACK_NIGHTS_TOTAL).increment(nights.len() as u64);
    }

    // ── Admin surface ────────────────────────────────────

    pub async fn create_room_type(&self, id: Ulid, name: String) -> Result<(), EngineError> {
        if name.trim().is_empty() {
            return Err(EngineError::InvalidInput("room type name is required"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("room type name too long"));
        }
        if self.room_types.len() >= MAX_ROOM_TYPES {
            return Err(EngineError::LimitExceeded("too many room types"));
        }
        if self.room_types.contains_key(&id) {
            return Err(EngineError::AlreadyExists(id));
        }

        let event = Event::RoomTypeCreated { id, name: name.clone() };
        let _commit = self.commit_gate.read().await;
        self.journal_append(&event).await?;
        self.room_types.insert(id, RoomType { id, name });
        Ok(())
    }

    /// Bulk insert/overwrite of per-night price and stock. Out-of-band
    /// administrative tooling; must not run concurrently with live traffic.
    ///
    /// The batch is one journal entry: a storage failure applies nothing.
    pub async fn seed_inventory(
        &self,
        room_type_id: Ulid,
        rows: &[SeedRow],
    ) -> Result<(), EngineError> {
        if !self.room_types.contains_key(&room_type_id) {
            return Err(EngineError::UnknownRoomType(room_type_id));
        }
        if rows.len() > MAX_SEED_BATCH {
            return Err(EngineError::LimitExceeded("seed batch too large"));
        }

        let event = Event::InventorySeeded { room_type_id, rows: rows.to_vec() };
        let _commit = self.commit_gate.read().await;
        self.journal_append(&event).await?;
        for row in rows {
            self.inventory.upsert(room_type_id, row.date, row.price, row.remaining);
        }
        Ok(())
    }

    // ── Journal compaction ───────────────────────────────

    /// Rewrite the journal as the minimal event set that recreates the
    /// current state. Replay stays a single rule (seeds set state, bookings
    /// decrement), so each seed is emitted at `current remaining + what the
    /// retained bookings will re-subtract`.
    pub async fn compact_journal(&self) -> Result<(), EngineError> {
        // Exclusive side of the commit gate: no decrement+journal+apply
        // sequence may land between the snapshot below and the writer
        // swapping in the rewritten file.
        let _commit = self.commit_gate.write().await;
        let bookings = self.ledger.snapshot().await;

        let mut booked: HashMap<(Ulid, NaiveDate), u32> = HashMap::new();
        for booking in &bookings {
            for night in booking.stay().nights() {
                *booked.entry((booking.room_type_id, night)).or_default() += booking.quantity;
            }
        }

        let mut events: Vec<Event> = Vec::new();
        for entry in self.room_types.iter() {
            let rt = entry.value();
            events.push(Event::RoomTypeCreated { id: rt.id, name: rt.name.clone() });
        }
        let mut seeds: HashMap<Ulid, Vec<SeedRow>> = HashMap::new();
        for (key, record) in self.inventory.snapshot() {
            let rebooked = booked.get(&key).copied().unwrap_or(0);
            seeds.entry(key.0).or_default().push(SeedRow {
                date: key.1,
                price: record.price,
                remaining: record.remaining + rebooked,
            });
        }
        for (room_type_id, rows) in seeds {
            events.push(Event::InventorySeeded { room_type_id, rows });
        }
        events.extend(bookings.into_iter().map(|booking| Event::BookingConfirmed { booking }));

        let (tx, rx) = oneshot::channel();
        self.journal_tx
            .send(JournalCommand::Compact { events, response: tx })
            .await
            .map_err(|_| EngineError::Storage("journal writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::Storage("journal writer dropped response".into()))?
            .map_err(|e| EngineError::Storage(e.to_string()))
    }
}
