use serde::Serialize;
use std::fmt;

/// Connection phase, numbered the way MongoDB ODMs report `readyState`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    #[default]
    Disconnected,
    Connected,
    Connecting,
    Disconnecting,
}

impl ReadyState {
    /// Numeric code: 0 disconnected, 1 connected, 2 connecting, 3 disconnecting
    pub fn code(self) -> u8 {
        match self {
            ReadyState::Disconnected => 0,
            ReadyState::Connected => 1,
            ReadyState::Connecting => 2,
            ReadyState::Disconnecting => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReadyState::Disconnected => "disconnected",
            ReadyState::Connected => "connected",
            ReadyState::Connecting => "connecting",
            ReadyState::Disconnecting => "disconnecting",
        }
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a managed connection, for health checks
///
/// The default value is what a manager reports before any connection
/// attempt: not connected, no retries, empty host and database name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    /// True only between a driver "connected" event and the next error or
    /// disconnect event
    pub is_connected: bool,
    pub ready_state: ReadyState,
    /// Empty until the first successful connect
    pub host: String,
    /// Empty until the first successful connect
    pub database_name: String,
    /// Consecutive failed connect attempts, reset on success
    pub retry_count: u32,
}

impl ConnectionStatus {
    /// Healthy means the driver has confirmed the connection
    pub fn is_healthy(&self) -> bool {
        self.is_connected && self.ready_state == ReadyState::Connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_disconnected() {
        let status = ConnectionStatus::default();
        assert!(!status.is_connected);
        assert_eq!(status.ready_state, ReadyState::Disconnected);
        assert_eq!(status.retry_count, 0);
        assert!(status.host.is_empty());
        assert!(status.database_name.is_empty());
        assert!(!status.is_healthy());
    }

    #[test]
    fn test_ready_state_codes() {
        assert_eq!(ReadyState::Disconnected.code(), 0);
        assert_eq!(ReadyState::Connected.code(), 1);
        assert_eq!(ReadyState::Connecting.code(), 2);
        assert_eq!(ReadyState::Disconnecting.code(), 3);
    }

    #[test]
    fn test_status_serializes_for_health_consumers() {
        let status = ConnectionStatus {
            is_connected: true,
            ready_state: ReadyState::Connected,
            host: "db.internal:27017".into(),
            database_name: "app".into(),
            retry_count: 0,
        };

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["is_connected"], true);
        assert_eq!(json["ready_state"], "connected");
        assert_eq!(json["host"], "db.internal:27017");
        assert_eq!(json["database_name"], "app");
        assert_eq!(json["retry_count"], 0);
    }
}
