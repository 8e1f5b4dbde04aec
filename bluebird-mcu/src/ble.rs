//! BLE GATT service types and traits for Bluebird commissioning
//!
//! Protocol constants (UUIDs, status values) are in bluebird_proto::ble.
//! This module provides device-side types and the trait a BLE stack implements.

pub use bluebird_proto::ble::{
    LOCAL_NAME, MAX_ATTRIBUTE_LEN, PAYLOAD_UUID, PUBLIC_KEY_UUID, SERVICE_UUID, SSID_UUID,
    STATUS_UUID, status,
};

/// A write received on one of the commissioning characteristics
#[derive(Clone, PartialEq, Eq)]
pub enum BleWrite {
    /// Plaintext SSID
    Ssid(Vec<u8>),
    /// Encrypted password payload
    Payload(Vec<u8>),
}

impl BleWrite {
    /// Map a characteristic write to a commissioning event.
    ///
    /// Returns `None` for characteristics that do not accept writes.
    pub fn from_characteristic(uuid: &str, data: &[u8]) -> Option<Self> {
        if uuid.eq_ignore_ascii_case(SSID_UUID) {
            Some(BleWrite::Ssid(data.to_vec()))
        } else if uuid.eq_ignore_ascii_case(PAYLOAD_UUID) {
            Some(BleWrite::Payload(data.to_vec()))
        } else {
            None
        }
    }
}

impl std::fmt::Debug for BleWrite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BleWrite::Ssid(ssid) => f
                .debug_tuple("Ssid")
                .field(&String::from_utf8_lossy(ssid))
                .finish(),
            BleWrite::Payload(payload) => write!(f, "Payload({} bytes)", payload.len()),
        }
    }
}

/// Commissioning status exposed on the status characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    /// Public key published, waiting for a payload
    Awaiting,
    /// Credentials accepted and WiFi joined
    Connected,
    /// Payload rejected (malformed, wrong key, tampered)
    Rejected,
    /// Credentials decrypted but the WiFi join failed
    WifiFailed,
}

impl DeviceStatus {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            DeviceStatus::Awaiting => status::AWAITING,
            DeviceStatus::Connected => status::CONNECTED,
            DeviceStatus::Rejected => status::REJECTED,
            DeviceStatus::WifiFailed => status::WIFI_FAILED,
        }
    }

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        [
            DeviceStatus::Awaiting,
            DeviceStatus::Connected,
            DeviceStatus::Rejected,
            DeviceStatus::WifiFailed,
        ]
        .into_iter()
        .find(|s| s.as_bytes() == data)
    }
}

/// Trait for BLE GATT server implementations
///
/// Device-specific crates implement this trait using their BLE stack.
pub trait BleServer {
    /// Error type for BLE operations
    type Error: std::fmt::Debug;

    /// Start BLE advertising with the given device name
    fn start_advertising(&mut self, device_name: &str) -> Result<(), Self::Error>;

    /// Stop BLE advertising
    fn stop_advertising(&mut self) -> Result<(), Self::Error>;

    /// Set the value of the public key characteristic
    fn set_public_key(&mut self, public_key: &[u8]) -> Result<(), Self::Error>;

    /// Take the next pending characteristic write (non-blocking)
    fn poll_write(&mut self) -> Option<BleWrite>;

    /// Update the status characteristic value
    fn set_status(&mut self, status: DeviceStatus) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_writes_by_uuid() {
        assert_eq!(
            BleWrite::from_characteristic(SSID_UUID, b"home"),
            Some(BleWrite::Ssid(b"home".to_vec()))
        );
        assert_eq!(
            BleWrite::from_characteristic(&PAYLOAD_UUID.to_uppercase(), &[1, 2]),
            Some(BleWrite::Payload(vec![1, 2]))
        );
        assert_eq!(BleWrite::from_characteristic(PUBLIC_KEY_UUID, &[1]), None);
    }

    #[test]
    fn status_round_trip() {
        for status in [
            DeviceStatus::Awaiting,
            DeviceStatus::Connected,
            DeviceStatus::Rejected,
            DeviceStatus::WifiFailed,
        ] {
            assert_eq!(DeviceStatus::from_bytes(status.as_bytes()), Some(status));
        }
        assert_eq!(DeviceStatus::from_bytes(b"ready"), None);
    }

    #[test]
    fn payload_debug_hides_bytes() {
        let shown = format!("{:?}", BleWrite::Payload(vec![0xab; 80]));
        assert_eq!(shown, "Payload(80 bytes)");
    }
}
