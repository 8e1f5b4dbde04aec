//! BLE client for commissioning Bluebird devices
//!
//! Scans for devices, reads the responder public key, and delivers the SSID
//! and the encrypted password payload.

use btleplug::api::{Central, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType};
use btleplug::platform::{Adapter, Manager, Peripheral};
use log::*;
use std::time::Duration;
use uuid::Uuid;

use bluebird_exchange::{CredentialExchange, CurveProfile, ExchangeHandler};
use bluebird_proto::ble::{
    LOCAL_NAME, PAYLOAD_UUID, PUBLIC_KEY_UUID, SERVICE_UUID, SSID_UUID, STATUS_UUID, status,
};

const FIND_SCAN_SECS: u64 = 5;
const STATUS_POLLS: usize = 20;
const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("bluetooth error: {0}")]
    Btle(#[from] btleplug::Error),
    #[error("no Bluetooth adapter found")]
    NoAdapter,
    #[error("no Bluebird device found")]
    NotFound,
    #[error("{0} characteristic not found")]
    MissingCharacteristic(&'static str),
    #[error("invalid UUID: {0}")]
    Uuid(#[from] uuid::Error),
    #[error(transparent)]
    Exchange(#[from] bluebird_exchange::Error),
    #[error(transparent)]
    Proto(#[from] bluebird_proto::ProtoError),
}

/// A discovered BLE device
#[derive(Debug, Clone)]
pub struct BluebirdDevice {
    pub name: String,
    pub address: String,
    pub rssi: Option<i16>,
    pub is_bluebird: bool,
}

fn parse_uuid(s: &str) -> Result<Uuid, ControllerError> {
    Ok(Uuid::parse_str(s)?)
}

// Match "Bluebird-xxx" or "nimble [Bluebird-xxx]" names, or the advertised service
fn is_bluebird(name: &str, services: &[Uuid], service: Uuid) -> bool {
    name.starts_with(LOCAL_NAME)
        || name.contains(&format!("[{LOCAL_NAME}"))
        || services.contains(&service)
}

/// Get the default Bluetooth adapter
pub async fn get_adapter() -> Result<Adapter, ControllerError> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;
    adapters.into_iter().next().ok_or(ControllerError::NoAdapter)
}

/// Scan for BLE devices
///
/// Returns every discovered device. Bluebird devices have `is_bluebird = true`.
pub async fn scan(duration_secs: u64) -> Result<Vec<BluebirdDevice>, ControllerError> {
    let adapter = get_adapter().await?;
    let service = parse_uuid(SERVICE_UUID)?;

    adapter.start_scan(ScanFilter::default()).await?;
    tokio::time::sleep(Duration::from_secs(duration_secs)).await;

    let peripherals = adapter.peripherals().await?;
    let mut devices = Vec::new();

    for peripheral in peripherals {
        if let Some(props) = peripheral.properties().await? {
            let name = props.local_name.unwrap_or_else(|| "Unknown".to_string());
            let is_bluebird = is_bluebird(&name, &props.services, service);
            devices.push(BluebirdDevice {
                name,
                address: peripheral.address().to_string(),
                rssi: props.rssi,
                is_bluebird,
            });
        }
    }

    adapter.stop_scan().await?;
    debug!("Scan found {} devices", devices.len());
    Ok(devices)
}

/// Find a device by name/address pattern, or the first Bluebird device
pub async fn find_device(target: Option<&str>) -> Result<Peripheral, ControllerError> {
    let adapter = get_adapter().await?;
    let service = parse_uuid(SERVICE_UUID)?;

    adapter.start_scan(ScanFilter::default()).await?;
    tokio::time::sleep(Duration::from_secs(FIND_SCAN_SECS)).await;

    for peripheral in adapter.peripherals().await? {
        if let Some(props) = peripheral.properties().await? {
            let name = props.local_name.unwrap_or_default();
            let addr = peripheral.address().to_string();

            let matches = match target {
                Some(t) => name.contains(t) || addr.contains(t),
                None => is_bluebird(&name, &props.services, service),
            };

            if matches {
                adapter.stop_scan().await?;
                info!("Found device: {} ({})", name, addr);
                return Ok(peripheral);
            }
        }
    }

    adapter.stop_scan().await?;
    Err(ControllerError::NotFound)
}

fn characteristic(
    characteristics: &[Characteristic],
    uuid: &str,
    label: &'static str,
) -> Result<Characteristic, ControllerError> {
    let uuid = parse_uuid(uuid)?;
    characteristics
        .iter()
        .find(|c| c.uuid == uuid)
        .cloned()
        .ok_or(ControllerError::MissingCharacteristic(label))
}

// Checked before touching the radio
fn check_password_fits(
    profile: CurveProfile,
    password: &str,
    mtu: usize,
) -> Result<(), ControllerError> {
    Ok(bluebird_proto::check_mtu(profile.payload_len(password.len()), mtu)?)
}

/// Commission a device with WiFi credentials
///
/// Reads the device public key, encrypts `password` for it, and writes the
/// SSID followed by the payload. Returns the status the device reports once
/// it has processed the payload.
///
/// # Arguments
/// * `target` - Device name/address pattern, or None to find any Bluebird device
/// * `profile` - Curve the device was configured with
/// * `mtu` - Largest single write the link accepts
pub async fn provision(
    target: Option<&str>,
    profile: CurveProfile,
    ssid: &str,
    password: &str,
    mtu: usize,
) -> Result<String, ControllerError> {
    check_password_fits(profile, password, mtu)?;

    let device = find_device(target).await?;

    device.connect().await?;
    let result = exchange(&device, profile, ssid, password, mtu).await;
    if let Err(e) = device.disconnect().await {
        warn!("Disconnect failed: {e}");
    }
    result
}

async fn exchange(
    device: &Peripheral,
    profile: CurveProfile,
    ssid: &str,
    password: &str,
    mtu: usize,
) -> Result<String, ControllerError> {
    device.discover_services().await?;
    let characteristics: Vec<Characteristic> = device.characteristics().into_iter().collect();

    let key_char = characteristic(&characteristics, PUBLIC_KEY_UUID, "public key")?;
    let ssid_char = characteristic(&characteristics, SSID_UUID, "WiFi SSID")?;
    let payload_char = characteristic(&characteristics, PAYLOAD_UUID, "payload")?;
    let status_char = characteristic(&characteristics, STATUS_UUID, "status")?;

    let peer_key = device.read(&key_char).await?;
    debug!("Read {} byte {} public key", peer_key.len(), profile);

    let payload =
        ExchangeHandler::initiator(profile).produce_payload(password.as_bytes(), &peer_key)?;
    bluebird_proto::check_mtu(payload.len(), mtu)?;

    info!("Sending SSID {} and {} byte payload", ssid, payload.len());
    device.write(&ssid_char, ssid.as_bytes(), WriteType::WithResponse).await?;
    device.write(&payload_char, &payload, WriteType::WithResponse).await?;

    // The device rotates its key and reports the outcome once it has tried the join
    for _ in 0..STATUS_POLLS {
        let value = device.read(&status_char).await?;
        if value != status::AWAITING {
            return Ok(String::from_utf8_lossy(&value).into_owned());
        }
        tokio::time::sleep(STATUS_POLL_INTERVAL).await;
    }
    Ok(String::from_utf8_lossy(status::AWAITING).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_uuids_parse() {
        for uuid in [SERVICE_UUID, SSID_UUID, PAYLOAD_UUID, PUBLIC_KEY_UUID, STATUS_UUID] {
            assert!(parse_uuid(uuid).is_ok(), "{uuid}");
        }
        assert!(matches!(parse_uuid("not-a-uuid"), Err(ControllerError::Uuid(_))));
    }

    #[test]
    fn oversize_password_refused() {
        let password = "p".repeat(CurveProfile::X448.max_plaintext_len(100));
        assert!(check_password_fits(CurveProfile::X448, &password, 100).is_ok());

        let password = format!("{password}!");
        let err = check_password_fits(CurveProfile::X448, &password, 100).unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Proto(bluebird_proto::ProtoError::ExceedsMtu { len: 101, mtu: 100 })
        ));
    }

    #[test]
    fn recognises_bluebird_names() {
        let service = parse_uuid(SERVICE_UUID).unwrap();
        assert!(is_bluebird("Bluebird-7f3a", &[], service));
        assert!(is_bluebird("nimble [Bluebird-7f3a]", &[], service));
        assert!(is_bluebird("Unknown", &[service], service));
        assert!(!is_bluebird("Headphones", &[], service));
    }
}
