//! Bluebird BLE Controller
//!
//! Initiator side of the credential exchange: finds a Bluebird device, reads
//! its public key, and writes the SSID and an encrypted password payload.
//!
//! # Example
//!
//! ```ignore
//! use bluebird_ble_controller::ble;
//! use bluebird_proto::CurveProfile;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     for device in ble::scan(5).await? {
//!         println!("{} ({})", device.name, device.address);
//!     }
//!
//!     let status = ble::provision(None, CurveProfile::X25519, "MySSID", "MyPassword", 512).await?;
//!     println!("device status: {status}");
//!
//!     Ok(())
//! }
//! ```

pub mod ble;

pub use ble::{BluebirdDevice, ControllerError};
