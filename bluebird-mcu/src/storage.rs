//! Persistent storage for received WiFi credentials
//!
//! Only the credentials are persisted. Exchange keys never are.

/// WiFi credentials received over BLE
#[derive(Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: String,
    pub password: String,
}

impl std::fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Trait for persistent storage operations
///
/// Device crates implement this on their storage backend (NVS, flash, a file).
pub trait Storage {
    /// Error type for storage operations
    type Error: std::fmt::Debug;

    /// Get saved WiFi credentials
    fn get_wifi_credentials(&self) -> Result<Option<WifiCredentials>, Self::Error>;

    /// Save WiFi credentials
    fn set_wifi_credentials(&mut self, credentials: &WifiCredentials) -> Result<(), Self::Error>;

    /// Clear WiFi credentials
    fn clear_wifi_credentials(&mut self) -> Result<(), Self::Error>;
}
