//! Canonical structured event names used across `ddata-pubsub`.

// Local registry and snapshot events.
pub const SNAPSHOT_PUBLISHED: &str = "snapshot_published";
pub const SUBSCRIPTION_CHANGED: &str = "subscription_changed";

// Delta tracking and flush events.
pub const DELTA_RESYNC_REQUESTED: &str = "delta_resync_requested";
pub const DELTA_FLUSH_START: &str = "delta_flush_start";
pub const DELTA_FLUSH_OK: &str = "delta_flush_ok";
pub const DELTA_FLUSH_FAILED: &str = "delta_flush_failed";
pub const FLUSHER_START: &str = "flusher_start";
pub const FLUSHER_STOP: &str = "flusher_stop";

// Replicated store events.
pub const REPLICATED_PUT_OK: &str = "replicated_put_ok";
pub const REPLICATED_PUT_SKIPPED_EMPTY: &str = "replicated_put_skipped_empty";
pub const REPLICATED_READ_FAILED: &str = "replicated_read_failed";
pub const REMOTE_LOOKUP_DEGRADED: &str = "remote_lookup_degraded";

// Membership events.
pub const MEMBER_REMOVED: &str = "member_removed";
pub const MEMBER_REMOVE_FAILED: &str = "member_remove_failed";
pub const MEMBERSHIP_RECV_LAGGED: &str = "membership_recv_lagged";
pub const MEMBERSHIP_RECV_CLOSED: &str = "membership_recv_closed";
pub const MEMBERSHIP_RECONCILED: &str = "membership_reconciled";
pub const MEMBERSHIP_RECONCILE_FAILED: &str = "membership_reconcile_failed";

// Configuration events.
pub const CONFIG_LOADED: &str = "config_loaded";
