//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names consistent across the engine, the
//! store and the matching worker.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Non-fatal conditions surfaced while rendering or matching
pub const EVENT_CYCLE_PRUNED: &str = "cycle_pruned";
pub const EVENT_BOUND_REACHED: &str = "bound_reached";
pub const EVENT_JOB_FAILED: &str = "job_failed";
