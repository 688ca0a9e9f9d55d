//! sea-orm models for the topology tables.
//!
//! Every polled entity carries `idx_event`, the generation that last
//! confirmed it, and an `enabled` flag cleared by the sweep.

pub mod device;
pub mod event;
pub mod l1interface;
pub mod location;
pub mod mac;
pub mod macip;
pub mod macport;
pub mod oui;
pub mod prelude;
pub mod vlan;
pub mod vlanport;
pub mod zone;

/// Primary key of the seeded "unknown" row in `oui`.
pub const UNKNOWN_OUI: i32 = 1;

/// Primary key of the seeded default row in `zone`.
pub const DEFAULT_ZONE: i32 = 1;
