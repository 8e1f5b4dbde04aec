//! Bluebird MCU Library
//!
//! Device-side building blocks for receiving WiFi credentials over BLE.
//!
//! This crate provides:
//! - BLE GATT service types and the [`BleServer`] trait
//! - Traits for WiFi and persistent storage
//! - [`CommissioningSession`], which drives one responder through the
//!   credential exchange on top of those traits
//!
//! The session holds no global state: everything it needs is passed in at
//! construction, and each concurrent session owns its own key pair.

pub mod ble;
mod session;
pub mod storage;
pub mod wifi;

pub use ble::{BleServer, BleWrite, DeviceStatus};
pub use session::{CommissioningSession, Outcome, RejectReason, SessionError};
pub use storage::{Storage, WifiCredentials};
pub use wifi::{Wifi, WifiStatus};
