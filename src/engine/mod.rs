mod availability;
mod error;
mod ledger;
mod reserve;
mod store;

pub use error::EngineError;
pub use ledger::BookingLedger;
pub use reserve::ReservationRequest;
pub use store::InventoryStore;

use std::io;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot, RwLock};
use ulid::Ulid;

use crate::config::Config;
use crate::journal::Journal;
use crate::model::*;
use crate::notify::NotifyHub;

// ── Group-commit journal channel ─────────────────────────

pub(super) enum JournalCommand {
    Append {
        event: Event,
        response: oneshot::Sender<io::Result<()>>,
    },
    Compact {
        events: Vec<Event>,
        response: oneshot::Sender<io::Result<()>>,
    },
    AppendsSinceCompact {
        response: oneshot::Sender<u64>,
    },
    /// Stop the writer task so later appends fail with a storage error.
    #[cfg(test)]
    Shutdown,
}

/// Background task that owns the journal and batches appends for group
/// commit: block for the first append, drain whatever else is immediately
/// queued, write the whole batch, one fsync, then answer every waiter.
async fn journal_writer_loop(mut journal: Journal, mut rx: mpsc::Receiver<JournalCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            JournalCommand::Append { event, response } => {
                let mut batch = vec![(event, response)];
                let mut deferred = None;

                loop {
                    match rx.try_recv() {
                        Ok(JournalCommand::Append { event, response }) => {
                            batch.push((event, response));
                        }
                        Ok(other) => {
                            // Flush the batch first so the non-append command
                            // sees a settled file.
                            deferred = Some(other);
                            break;
                        }
                        Err(_) => break, // channel drained
                    }
                }

                flush_batch(&mut journal, &mut batch);
                if let Some(cmd) = deferred
                    && !handle_non_append(&mut journal, cmd)
                {
                    return;
                }
            }
            other => {
                if !handle_non_append(&mut journal, other) {
                    return;
                }
            }
        }
    }
}

fn flush_batch(journal: &mut Journal, batch: &mut Vec<(Event, oneshot::Sender<io::Result<()>>)>) {
    metrics::histogram!(crate::observability::JOURNAL_FLUSH_BATCH_SIZE)
        .record(batch.len() as f64);
    let flush_start = std::time::Instant::now();

    let mut result: io::Result<()> = Ok(());
    for (event, _) in batch.iter() {
        if let Err(e) = journal.append_buffered(event) {
            result = Err(e);
            break;
        }
    }
    // Flush even on append error so partially buffered bytes don't leak
    // into the next batch (these callers were told this batch failed).
    let flush_err = journal.flush_sync().err();
    if result.is_ok()
        && let Some(e) = flush_err {
            result = Err(e);
        }

    metrics::histogram!(crate::observability::JOURNAL_FLUSH_DURATION_SECONDS)
        .record(flush_start.elapsed().as_secs_f64());

    for (_, tx) in batch.drain(..) {
        let r = match &result {
            Ok(()) => Ok(()),
            Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
        };
        let _ = tx.send(r);
    }
}

/// Returns false when the writer should stop.
fn handle_non_append(journal: &mut Journal, cmd: JournalCommand) -> bool {
    match cmd {
        JournalCommand::Compact { events, response } => {
            let result = Journal::write_compact_file(journal.path(), &events)
                .and_then(|()| journal.swap_compact_file());
            let _ = response.send(result);
            true
        }
        JournalCommand::AppendsSinceCompact { response } => {
            let _ = response.send(journal.appends_since_compact());
            true
        }
        #[cfg(test)]
        JournalCommand::Shutdown => false,
        JournalCommand::Append { .. } => unreachable!(),
    }
}

// ── Engine ───────────────────────────────────────────────

/// The reservation core. Owns the room-type catalog, the per-night
/// inventory, and the booking ledger; all durable mutations flow through
/// the group-commit journal writer.
pub struct Engine {
    pub(super) room_types: DashMap<Ulid, RoomType>,
    pub(super) inventory: InventoryStore,
    pub(super) ledger: BookingLedger,
    journal_tx: mpsc::Sender<JournalCommand>,
    /// Mutation paths hold `read` while they decrement, journal, and apply;
    /// compaction holds `write` across its snapshot and the `Compact`
    /// command. Without this, a reservation landing mid-snapshot is either
    /// dropped from the rewritten journal or double-applied on replay.
    pub(super) commit_gate: RwLock<()>,
    pub notify: Arc<NotifyHub>,
}

impl Engine {
    /// Open the engine by replaying the journal at `config.journal_path()`.
    /// Must run inside a tokio runtime (spawns the journal writer).
    pub fn new(config: &Config, notify: Arc<NotifyHub>) -> io::Result<Self> {
        let journal_path = config.journal_path();
        let events = Journal::replay(&journal_path)?;
        let journal = Journal::open(&journal_path)?;
        let (journal_tx, journal_rx) = mpsc::channel(4096);
        tokio::spawn(journal_writer_loop(journal, journal_rx));

        let room_types = DashMap::new();
        let inventory = InventoryStore::new();
        let mut bookings = Vec::new();

        for event in events {
            match event {
                Event::RoomTypeCreated { id, name } => {
                    room_types.insert(id, RoomType { id, name });
                }
                Event::InventorySeeded { room_type_id, rows } => {
                    for row in rows {
                        inventory.upsert(room_type_id, row.date, row.price, row.remaining);
                    }
                }
                Event::BookingConfirmed { booking } => {
                    for night in booking.stay().nights() {
                        let applied = inventory.conditional_decrement(
                            booking.room_type_id,
                            night,
                            booking.quantity,
                        );
                        debug_assert!(applied, "journal replay must never oversell");
                    }
                    bookings.push(booking);
                }
            }
        }

        Ok(Self {
            room_types,
            inventory,
            ledger: BookingLedger::from_bookings(bookings),
            journal_tx,
            commit_gate: RwLock::new(()),
            notify,
        })
    }

    /// Stop the journal writer, making every subsequent append fail.
    #[cfg(test)]
    pub(super) async fn shutdown_journal_writer(&self) {
        let _ = self.journal_tx.send(JournalCommand::Shutdown).await;
    }

    /// Durably record one event via the group-commit writer.
    pub(super) async fn journal_append(&self, event: &Event) -> Result<(), EngineError> {
        let (tx, rx) = oneshot::channel();
        self.journal_tx
            .send(JournalCommand::Append { event: event.clone(), response: tx })
            .await
            .map_err(|_| EngineError::Storage("journal writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::Storage("journal writer dropped response".into()))?
            .map_err(|e| EngineError::Storage(e.to_string()))
    }

    pub fn room_types(&self) -> Vec<RoomType> {
        self.room_types.iter().map(|e| e.value().clone()).collect()
    }

    pub fn room_type(&self, id: &Ulid) -> Option<RoomType> {
        self.room_types.get(id).map(|e| e.value().clone())
    }

    /// Point read of a single night. Test/observation surface; the booking
    /// path goes through `reserve`.
    pub fn night(&self, room_type_id: Ulid, date: chrono::NaiveDate) -> Option<InventoryRecord> {
        self.inventory.get(room_type_id, date)
    }

    pub async fn list_recent(&self, limit: usize) -> Vec<Booking> {
        self.ledger.list_recent(limit).await
    }

    pub async fn booking_count(&self) -> usize {
        self.ledger.len().await
    }

    pub async fn journal_appends_since_compact(&self) -> u64 {
        let (tx, rx) = oneshot::channel();
        if self
            .journal_tx
            .send(JournalCommand::AppendsSinceCompact { response: tx })
            .await
            .is_err()
        {
            return 0;
        }
        rx.await.unwrap_or(0)
    }
}
