//! WiFi abstraction trait
//!
//! The commissioning session joins the network it was just given through this
//! trait; device crates implement it on their WiFi stack.

/// WiFi connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiStatus {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// Trait for WiFi operations
pub trait Wifi {
    /// Error type for WiFi operations
    type Error: std::fmt::Debug;

    /// Connect to a WiFi network
    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), Self::Error>;

    /// Disconnect from WiFi
    fn disconnect(&mut self) -> Result<(), Self::Error>;

    /// Get current connection status
    fn status(&self) -> WifiStatus;

    /// Check if connected
    fn is_connected(&self) -> bool {
        self.status() == WifiStatus::Connected
    }
}
