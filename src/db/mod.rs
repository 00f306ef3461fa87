//! Data access for the LightBnB schema.
//!
//! Every operation issues a single parameterized statement against the
//! shared pool and reports absence as `None` rather than as an error.

pub mod filters;
pub mod models;
pub mod operations;

pub use filters::{dollars_to_cents, PropertyFilter};
pub use models::{
    GuestReservation, NewProperty, NewUser, Property, PropertyListing, Reservation, User,
};
pub use operations::{connect_pool, DbOperations, DbPoolStatus};

/// Rows returned by the list queries when the caller gives no limit.
pub const DEFAULT_LIMIT: i64 = 10;
