//! Encryption flow - both sides of a commissioning exchange in one process
//!
//! Usage:
//!   cargo run --example encryption-flow -p bluebird-exchange -- [curve] [password]
//!
//! `curve` is curve25519 (default) or curve448.

use bluebird_exchange::{CurveProfile, ExchangeHandler};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let profile: CurveProfile = args.next().as_deref().unwrap_or("curve25519").parse()?;
    let password = args.next().unwrap_or_else(|| "MyWiFiPass12345!".to_string());

    // Responder: generate a key pair and publish the public half
    let mut responder = ExchangeHandler::responder(profile);
    let responder_key = responder.generate_key_pair()?.to_vec();
    println!("Responder public key ({} bytes): {:02x?}", responder_key.len(), responder_key);

    // Initiator: ephemeral key pair, shared secret, encrypt, frame
    let initiator = ExchangeHandler::initiator(profile);
    let payload = initiator.create_encrypted_payload(password.as_bytes(), &responder_key)?;
    println!(
        "Payload ({} bytes = {} overhead + {} plaintext): {:02x?}",
        payload.len(),
        profile.overhead(),
        password.len(),
        payload
    );

    // Responder: split, recompute the shared secret, decrypt
    let plaintext = responder.decrypt_payload(&payload)?;
    println!("Decrypted: {}", String::from_utf8_lossy(&plaintext));

    Ok(())
}
