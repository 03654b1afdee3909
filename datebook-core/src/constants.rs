/// How far past the anchor a rule without an end date is expanded.
pub const DEFAULT_HORIZON_YEARS: u32 = 5;

/// Upper bound on the number of instances one expansion may produce.
pub const DEFAULT_MAX_INSTANCES: usize = 10_000;

/// Reminder lead time for events created without one.
pub const DEFAULT_NOTIFICATION_MINUTES: u32 = 10;

/// Period of the reminder loop.
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 1;
