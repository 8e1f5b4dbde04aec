//! BLE commissioning tool for Bluebird devices
//!
//! Scans for Bluebird devices and sends them WiFi credentials, with the
//! password encrypted for the device's public key.

use bluebird_ble_controller::ble;
use bluebird_exchange::{CredentialExchange, CurveProfile, ExchangeHandler};
use clap::{Parser, Subcommand};
use data_encoding::HEXLOWER;
use log::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bluebird-ble")]
#[command(about = "BLE commissioning tool for Bluebird devices")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan for Bluebird devices
    Scan {
        /// Scan duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Send encrypted WiFi credentials to a device
    Provision {
        /// Device name or address to connect to
        #[arg(short, long)]
        device: Option<String>,
        /// WiFi credentials file (SSID on line 1, password on line 2)
        #[arg(short, long, default_value = "wifi_credentials.txt")]
        file: String,
        /// Curve the device uses (curve25519 or curve448)
        #[arg(short, long, env = "BLUEBIRD_CURVE", default_value = "curve25519")]
        curve: String,
        /// Largest single BLE write the link accepts
        #[arg(long, default_value = "512")]
        mtu: usize,
    },
    /// Run both sides of the exchange locally and show the payload
    Selftest {
        /// Curve to test (curve25519 or curve448)
        #[arg(short, long, env = "BLUEBIRD_CURVE", default_value = "curve25519")]
        curve: String,
        /// Plaintext to send through the exchange
        #[arg(short, long, default_value = "MyWiFiPass12345!")]
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { duration } => {
            scan_devices(duration).await?;
        }
        Commands::Provision {
            device,
            file,
            curve,
            mtu,
        } => {
            let profile = parse_curve(&curve)?;
            let (ssid, password) = read_wifi_credentials(&file)?;
            provision_device(device.as_deref(), profile, &ssid, &password, mtu).await?;
        }
        Commands::Selftest { curve, message } => {
            selftest(parse_curve(&curve)?, message.as_bytes())?;
        }
    }

    Ok(())
}

fn parse_curve(selector: &str) -> Result<CurveProfile, bluebird_exchange::Error> {
    Ok(selector.parse::<CurveProfile>()?)
}

fn read_wifi_credentials(file: &str) -> Result<(String, String), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(file)?;
    let mut lines = content.lines();
    let ssid = lines.next().ok_or("Missing SSID in credentials file")?.trim().to_string();
    let password = lines
        .next()
        .ok_or("Missing password in credentials file")?
        .trim()
        .to_string();
    Ok((ssid, password))
}

async fn scan_devices(duration: u64) -> Result<(), Box<dyn std::error::Error>> {
    println!("Scanning for Bluebird devices ({} seconds)...", duration);

    let devices = ble::scan(duration).await?;

    println!("\nFound {} devices:", devices.len());
    for device in devices {
        let rssi = device
            .rssi
            .map(|r| format!("{} dBm", r))
            .unwrap_or_else(|| "N/A".to_string());
        let marker = if device.is_bluebird { " [BLUEBIRD]" } else { "" };
        println!("  {} ({}) RSSI: {}{}", device.name, device.address, rssi, marker);
    }

    Ok(())
}

async fn provision_device(
    target: Option<&str>,
    profile: CurveProfile,
    ssid: &str,
    password: &str,
    mtu: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Sending WiFi credentials ({})...", profile);
    println!("  SSID: {}", ssid);

    let status = ble::provision(target, profile, ssid, password, mtu).await?;
    println!("Device status: {}", status);
    Ok(())
}

fn selftest(profile: CurveProfile, message: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    let mut responder = ExchangeHandler::responder(profile);
    let responder_key = responder.generate_key_pair()?.to_vec();
    println!(
        "Responder public key ({} bytes): {}",
        responder_key.len(),
        HEXLOWER.encode(&responder_key)
    );

    let payload = ExchangeHandler::initiator(profile).produce_payload(message, &responder_key)?;
    println!(
        "Payload ({} bytes = {} overhead + {} plaintext): {}",
        payload.len(),
        profile.overhead(),
        message.len(),
        HEXLOWER.encode(&payload)
    );

    let decrypted = responder.consume_payload(&payload)?;
    if decrypted != message {
        return Err("decrypted message does not match".into());
    }
    info!("Selftest passed for {}", profile);
    println!("Decrypted: {}", String::from_utf8_lossy(&decrypted));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_selectors() {
        assert_eq!(parse_curve("curve448").unwrap(), CurveProfile::X448);
        assert_eq!(parse_curve("X25519").unwrap(), CurveProfile::X25519);
        let err = parse_curve("p256").unwrap_err();
        assert_eq!(err.kind(), bluebird_exchange::ErrorKind::Configuration);
    }

    #[test]
    fn selftest_runs_on_both_curves() {
        for profile in CurveProfile::ALL {
            selftest(profile, b"hello").unwrap();
        }
    }

    #[test]
    fn reads_credentials_file() {
        let path = std::env::temp_dir().join(format!("bluebird-creds-{}.txt", std::process::id()));
        std::fs::write(&path, "HomeNet\n  hunter2  \n").unwrap();
        let (ssid, password) = read_wifi_credentials(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(ssid, "HomeNet");
        assert_eq!(password, "hunter2");
    }
}
