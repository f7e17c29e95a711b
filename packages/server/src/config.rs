//! Runtime configuration for the server actors.

use std::time::Duration;

/// Settings of the waiting-room coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Waiting entries without activity for this long are dropped
    pub idle_timeout: Duration,
    /// How often idle entries are looked for
    pub sweep_interval: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(5),
        }
    }
}

/// Settings shared by every room session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomConfig {
    /// Messages kept in memory per room and replayed on connect
    pub history_capacity: usize,
    /// How long a room with no members is retained before eviction
    pub idle_grace: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            idle_grace: Duration::from_secs(30),
        }
    }
}

/// Full server configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub coordinator: CoordinatorConfig,
    pub room: RoomConfig,
}
