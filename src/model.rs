use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds, the only wall-clock type.
pub type Ms = i64;

/// Currency-agnostic whole-unit price for one night of one room.
pub type Price = u32;

pub fn now_ms() -> Ms {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before epoch")
        .as_millis() as Ms
}

/// A bookable category of rooms. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomType {
    pub id: Ulid,
    pub name: String,
}

/// Checkout-exclusive stay `[check_in, check_out)`.
///
/// The checkout date is never a night: a guest leaving on the 4th does not
/// consume inventory for the 4th.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        debug_assert!(check_in < check_out, "StayRange check_in must precede check_out");
        Self { check_in, check_out }
    }

    pub fn num_nights(&self) -> i64 {
        self.check_out.signed_duration_since(self.check_in).num_days()
    }

    /// Iterate the nights consumed by this stay, in date order.
    pub fn nights(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let check_out = self.check_out;
        std::iter::successors(Some(self.check_in), |d| d.succ_opt())
            .take_while(move |d| *d < check_out)
    }
}

/// Price and remaining stock for one (room type, night) key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub price: Price,
    /// Unsigned, so the non-negativity invariant holds by construction.
    pub remaining: u32,
}

/// One row of administrative seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRow {
    pub date: NaiveDate,
    pub price: Price,
    pub remaining: u32,
}

/// Guest contact fields, normalized before the engine is entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// A confirmed reservation. Immutable once appended to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    pub room_type_id: Ulid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    /// Rooms held per night, not cumulative across the stay.
    pub quantity: u32,
    pub guest: Guest,
    /// Sum over nights of `price * quantity`.
    pub total_price: u64,
    pub created_at: Ms,
}

impl Booking {
    pub fn stay(&self) -> StayRange {
        StayRange::new(self.check_in, self.check_out)
    }
}

/// The event types, kept flat. This is the journal record format.
///
/// Replay rule: seeds set state, bookings decrement. There is no separate
/// decrement event; replaying a `BookingConfirmed` re-applies its nights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    RoomTypeCreated {
        id: Ulid,
        name: String,
    },
    /// One seeding batch, all rows durable together or not at all.
    /// Each row overwrites any existing record for its key.
    InventorySeeded {
        room_type_id: Ulid,
        rows: Vec<SeedRow>,
    },
    BookingConfirmed {
        booking: Booking,
    },
}

// ── Query result types ───────────────────────────────────────────

/// One night in an availability projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NightAvailability {
    pub price: Price,
    pub remaining: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn stay_nights_are_checkout_exclusive() {
        let stay = StayRange::new(d("2025-01-01"), d("2025-01-04"));
        let nights: Vec<NaiveDate> = stay.nights().collect();
        assert_eq!(nights, vec![d("2025-01-01"), d("2025-01-02"), d("2025-01-03")]);
        assert_eq!(stay.num_nights(), 3);
    }

    #[test]
    fn single_night_stay() {
        let stay = StayRange::new(d("2025-06-01"), d("2025-06-02"));
        let nights: Vec<NaiveDate> = stay.nights().collect();
        assert_eq!(nights, vec![d("2025-06-01")]);
        assert_eq!(stay.num_nights(), 1);
    }

    #[test]
    fn stay_crosses_month_boundary() {
        let stay = StayRange::new(d("2025-01-31"), d("2025-02-02"));
        let nights: Vec<NaiveDate> = stay.nights().collect();
        assert_eq!(nights, vec![d("2025-01-31"), d("2025-02-01")]);
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = Event::BookingConfirmed {
            booking: Booking {
                id: Ulid::new(),
                room_type_id: Ulid::new(),
                check_in: d("2025-06-01"),
                check_out: d("2025-06-03"),
                quantity: 2,
                guest: Guest {
                    name: "Ada Lovelace".into(),
                    email: "ada@example.com".into(),
                    phone: None,
                    notes: Some("late arrival".into()),
                },
                total_price: 3200,
                created_at: 1_750_000_000_000,
            },
        };
        let bytes = bincode::serialize(&event).unwrap();
        let decoded: Event = bincode::deserialize(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn seed_event_roundtrip() {
        let event = Event::InventorySeeded {
            room_type_id: Ulid::new(),
            rows: vec![
                SeedRow { date: d("2025-06-01"), price: 880, remaining: 5 },
                SeedRow { date: d("2025-06-02"), price: 960, remaining: 5 },
            ],
        };
        let bytes = bincode::serialize(&event).unwrap();
        assert_eq!(bincode::deserialize::<Event>(&bytes).unwrap(), event);
    }
}
