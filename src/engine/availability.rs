use std::collections::BTreeMap;

use chrono::NaiveDate;
use ulid::Ulid;

use crate::limits::MAX_QUERY_DAYS;
use crate::model::NightAvailability;

use super::{Engine, EngineError};

impl Engine {
    /// Calendar projection for one room type over `[start, end]`, both
    /// endpoints inclusive. Only dates with an inventory record appear;
    /// absent dates are absent, not zero-capacity.
    ///
    /// Read-only; safe to call concurrently with any other operation.
    pub fn availability(
        &self,
        room_type_id: Ulid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, NightAvailability>, EngineError> {
        if start > end {
            return Err(EngineError::InvalidInput("end date before start date"));
        }
        if end.signed_duration_since(start).num_days() >= MAX_QUERY_DAYS {
            return Err(EngineError::LimitExceeded("query window too wide"));
        }

        Ok(self
            .inventory
            .read_range(room_type_id, start, end)
            .into_iter()
            .map(|(date, record)| {
                (date, NightAvailability { price: record.price, remaining: record.remaining })
            })
            .collect())
    }
}
