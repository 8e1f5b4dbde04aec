//! BLE GATT service constants for Bluebird commissioning
//!
//! The responder advertises [`SERVICE_UUID`] and exposes its public key for
//! reading. The initiator writes the SSID in plaintext and the password as an
//! encrypted payload, then reads back the status.

/// BLE Service UUID
pub const SERVICE_UUID: &str = "a07498ca-ad5b-474e-940d-16f1fbe7e8cd";

/// WiFi SSID characteristic (write, plaintext)
pub const SSID_UUID: &str = "51ff12bb-3ed8-46e5-ad5b-d64e2fec021b";

/// Encrypted password payload characteristic (write)
pub const PAYLOAD_UUID: &str = "bfc0c92f-317d-4ba9-976b-cc11ce77b4ca";

/// Responder public key characteristic (read)
pub const PUBLIC_KEY_UUID: &str = "bfc0c930-317d-4ba9-976b-cc11ce77b4ca";

/// Commissioning status characteristic (read/notify)
pub const STATUS_UUID: &str = "bfc0c931-317d-4ba9-976b-cc11ce77b4ca";

/// Local name the responder advertises
pub const LOCAL_NAME: &str = "Bluebird";

/// Largest value a single GATT attribute write may carry
pub const MAX_ATTRIBUTE_LEN: usize = 512;

/// Status values written to the status characteristic
pub mod status {
    pub const AWAITING: &[u8] = b"awaiting";
    pub const CONNECTED: &[u8] = b"connected";
    pub const REJECTED: &[u8] = b"rejected";
    pub const WIFI_FAILED: &[u8] = b"wifi_failed";
}
