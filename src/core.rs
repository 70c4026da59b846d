pub mod contract;
pub mod customer;
pub mod id;
pub mod period;
pub mod record;
pub mod slot;
pub mod source;
pub mod strategy;

use chrono_tz::Tz;

/// The portal reports in UTC, but invoicing periods and reports live in the Finnish time.
pub const TIME_ZONE: Tz = chrono_tz::Europe::Helsinki;
