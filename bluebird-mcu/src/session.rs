//! Responder-side commissioning session
//!
//! Drives one device through the exchange: publish a public key, collect the
//! SSID and the encrypted password, decrypt, persist, join WiFi. Every
//! payload (accepted or rejected) ends the attempt and rotates the key pair,
//! so an initiator that retries always encrypts for a fresh key.

use bluebird_exchange::{CredentialExchange, CurveProfile, ErrorKind, ExchangeHandler};
use log::*;

use crate::ble::{BleServer, BleWrite, DeviceStatus};
use crate::storage::{Storage, WifiCredentials};
use crate::wifi::Wifi;

#[derive(Debug, thiserror::Error)]
pub enum SessionError<B: std::fmt::Debug, S: std::fmt::Debug> {
    #[error("BLE error: {0:?}")]
    Ble(B),
    #[error("storage error: {0:?}")]
    Storage(S),
    #[error("key generation failed: {0}")]
    Exchange(#[from] bluebird_exchange::Error),
}

/// Why a payload was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Payload arrived before any SSID
    MissingSsid,
    /// SSID or decrypted password is not UTF-8
    InvalidUtf8,
    /// The exchange itself failed
    Exchange(ErrorKind),
}

/// Result of one commissioning attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Credentials stored and WiFi joined
    Connected(WifiCredentials),
    /// Credentials stored but the join failed
    WifiFailed(WifiCredentials),
    Rejected(RejectReason),
}

type Result<T, B, S> =
    std::result::Result<T, SessionError<<B as BleServer>::Error, <S as Storage>::Error>>;

pub struct CommissioningSession<B: BleServer, W: Wifi, S: Storage> {
    ble: B,
    wifi: W,
    storage: S,
    handler: ExchangeHandler,
    ssid: Option<Vec<u8>>,
}

impl<B: BleServer, W: Wifi, S: Storage> CommissioningSession<B, W, S> {
    pub fn new(profile: CurveProfile, ble: B, wifi: W, storage: S) -> Self {
        Self {
            ble,
            wifi,
            storage,
            handler: ExchangeHandler::responder(profile),
            ssid: None,
        }
    }

    pub fn profile(&self) -> CurveProfile {
        self.handler.profile()
    }

    /// Public key currently published, if the session has started
    pub fn public_key(&self) -> Option<&[u8]> {
        self.handler.own_public_key().ok()
    }

    /// Generate the first key pair, publish it and start advertising
    pub fn start(&mut self, device_name: &str) -> Result<(), B, S> {
        match self.storage.get_wifi_credentials() {
            Ok(Some(creds)) => info!("Replacing saved WiFi credentials for SSID={}", creds.ssid),
            Ok(None) => {}
            Err(e) => warn!("Could not read saved WiFi credentials: {:?}", e),
        }

        self.rotate_key()?;
        self.ble
            .set_status(DeviceStatus::Awaiting)
            .map_err(SessionError::Ble)?;
        self.ble.start_advertising(device_name).map_err(SessionError::Ble)?;
        info!(
            "Commissioning started as '{}' using {}",
            device_name,
            self.profile()
        );
        Ok(())
    }

    /// Stop advertising. The key pair is dropped with the session.
    pub fn stop(&mut self) -> Result<(), B, S> {
        self.ble.stop_advertising().map_err(SessionError::Ble)?;
        info!("Commissioning stopped");
        Ok(())
    }

    /// Handle the next pending BLE write, if any
    pub fn poll(&mut self) -> Result<Option<Outcome>, B, S> {
        match self.ble.poll_write() {
            Some(write) => self.handle_write(write),
            None => Ok(None),
        }
    }

    pub fn handle_write(&mut self, write: BleWrite) -> Result<Option<Outcome>, B, S> {
        match write {
            BleWrite::Ssid(ssid) => {
                debug!("BLE: Received SSID ({} bytes)", ssid.len());
                self.ssid = Some(ssid);
                // A new attempt starts here; clear the previous outcome
                self.ble
                    .set_status(DeviceStatus::Awaiting)
                    .map_err(SessionError::Ble)?;
                Ok(None)
            }
            BleWrite::Payload(payload) => {
                info!("BLE: Received payload ({} bytes)", payload.len());
                let outcome = self.commission(&payload);

                let status = match &outcome {
                    Ok(Outcome::Connected(_)) => DeviceStatus::Connected,
                    Ok(Outcome::WifiFailed(_)) => DeviceStatus::WifiFailed,
                    Ok(Outcome::Rejected(_)) | Err(_) => DeviceStatus::Rejected,
                };
                let reported = self.ble.set_status(status).map_err(SessionError::Ble);

                // One payload per key pair, even when the attempt failed
                let rotated = self.rotate_key();

                let outcome = outcome?;
                reported?;
                rotated?;
                Ok(Some(outcome))
            }
        }
    }

    /// Clear stored credentials and leave the network
    pub fn forget(&mut self) -> Result<(), B, S> {
        self.storage
            .clear_wifi_credentials()
            .map_err(SessionError::Storage)?;
        if self.wifi.is_connected() {
            if let Err(e) = self.wifi.disconnect() {
                warn!("WiFi disconnect failed: {:?}", e);
            }
        }
        info!("WiFi credentials cleared");
        Ok(())
    }

    pub fn ble(&self) -> &B {
        &self.ble
    }

    pub fn wifi(&self) -> &W {
        &self.wifi
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn commission(&mut self, payload: &[u8]) -> Result<Outcome, B, S> {
        let Some(ssid) = self.ssid.take() else {
            warn!("BLE: Payload received before SSID");
            return Ok(Outcome::Rejected(RejectReason::MissingSsid));
        };

        let password = match self.handler.consume_payload(payload) {
            Ok(password) => password,
            Err(e) => {
                warn!("Rejected credential payload: {}", e);
                return Ok(Outcome::Rejected(RejectReason::Exchange(e.kind())));
            }
        };

        let (Ok(ssid), Ok(password)) = (String::from_utf8(ssid), String::from_utf8(password))
        else {
            warn!("Rejected credentials: not UTF-8");
            return Ok(Outcome::Rejected(RejectReason::InvalidUtf8));
        };
        let credentials = WifiCredentials { ssid, password };

        self.storage
            .set_wifi_credentials(&credentials)
            .map_err(SessionError::Storage)?;
        info!("WiFi credentials saved: SSID={}", credentials.ssid);

        match self.wifi.connect(&credentials.ssid, &credentials.password) {
            Ok(()) => {
                info!("WiFi connected to {}", credentials.ssid);
                Ok(Outcome::Connected(credentials))
            }
            Err(e) => {
                error!("WiFi connection to {} failed: {:?}", credentials.ssid, e);
                Ok(Outcome::WifiFailed(credentials))
            }
        }
    }

    fn rotate_key(&mut self) -> Result<(), B, S> {
        let public = self.handler.generate_key_pair()?;
        self.ble.set_public_key(public).map_err(SessionError::Ble)?;
        debug!("Published new {} public key", self.handler.profile());
        Ok(())
    }
}
