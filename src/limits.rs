//! Hard caps on request and catalog sizes. Exceeding any of these is a
//! client error, not a capacity condition.

/// Longest bookable stay, in nights.
pub const MAX_STAY_NIGHTS: i64 = 90;

/// Widest availability window, in days (inclusive endpoints).
pub const MAX_QUERY_DAYS: i64 = 366;

pub const MAX_ROOM_TYPES: usize = 512;

pub const MAX_NAME_LEN: usize = 128;

/// Applies to each guest contact field (name, email, phone, notes).
pub const MAX_GUEST_FIELD_LEN: usize = 512;

/// Most (date, price, remaining) rows accepted in one seeding call.
pub const MAX_SEED_BATCH: usize = 4096;

/// Most rooms per night a single request may ask for.
pub const MAX_QUANTITY: u32 = 100;
