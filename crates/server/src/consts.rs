// Listener defaults
pub const DEFAULT_LOGIN_ADDR: &str = "0.0.0.0:5555";
pub const DEFAULT_GAME_ADDR: &str = "0.0.0.0:5556";
pub const DEFAULT_PUBLIC_ADDR: &str = "127.0.0.1:5556";

// Outbound dial to a game server
pub const GAME_DIAL_TIMEOUT_SECS: u64 = 3;

// A selection success without a port means the game server sits on 443
pub const FALLBACK_GAME_PORT: &str = "443";

#[cfg(debug_assertions)]
pub const DEFAULT_LOG_LEVEL: &str = "debug";

#[cfg(not(debug_assertions))]
pub const DEFAULT_LOG_LEVEL: &str = "info";
