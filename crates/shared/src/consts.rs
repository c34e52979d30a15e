// Ticket store defaults. Short on purpose: a ticket is expected to be
// redeemed within a single client round-trip.
pub const TICKET_TTL_SECS: u64 = 10;
pub const TICKET_SWEEP_INTERVAL_SECS: u64 = 1;

// Channel related constants
pub const CHANNEL_SIZE: usize = 64; // frames buffered between a socket reader and its session loop
