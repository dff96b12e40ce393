mod address;

pub use address::Address;

use rand::rngs::OsRng;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey, ecdsa::Signature};
use sha2::{Digest, Sha256};

/// Generate a new secp256k1 keypair and return (priv_hex, pub_hex_compressed, address_hex).
/// The address is the hex of the compressed public key.
pub fn generate_keypair_hex() -> (String, String, String) {
    let secp = Secp256k1::new();
    let (sk, pk) = secp.generate_keypair(&mut OsRng);
    let sk_hex = hex::encode(sk.secret_bytes());
    let pk_hex = hex::encode(pk.serialize()); // compressed (33 bytes)
    let address = pk_hex.clone();
    (sk_hex, pk_hex, address)
}

/// Derive the account address from a hex pubkey.
pub fn pubkey_to_address(pubkey_hex: &str) -> Result<Address, &'static str> {
    let bytes = hex::decode(pubkey_hex).map_err(|_| "invalid pubkey hex")?;
    let pk = PublicKey::from_slice(&bytes).map_err(|_| "invalid pubkey bytes")?;
    Ok(Address::new(hex::encode(pk.serialize())))
}

/// Compressed public key (hex) for a hex private key.
pub fn pubkey_from_secret_hex(secret_hex: &str) -> Result<String, &'static str> {
    let sk_bytes = hex::decode(secret_hex).map_err(|_| "invalid secret key hex")?;
    let sk = SecretKey::from_slice(&sk_bytes).map_err(|_| "invalid secret key bytes")?;
    Ok(hex::encode(PublicKey::from_secret_key(&Secp256k1::new(), &sk).serialize()))
}

/// SHA-256 of an arbitrary signing payload.
pub fn digest(payload: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..]);
    out
}

/// Verify a signature (hex DER) against the given pubkey (hex, compressed) and message hash (32 bytes).
pub fn verify_signature_hex(
    pubkey_hex: &str,
    sig_hex: &str,
    msg32: [u8; 32],
) -> Result<bool, &'static str> {
    let secp = Secp256k1::verification_only();

    let sig_bytes = hex::decode(sig_hex).map_err(|_| "invalid signature hex")?;
    let sig = Signature::from_der(&sig_bytes).map_err(|_| "invalid DER signature")?;

    let pk_bytes = hex::decode(pubkey_hex).map_err(|_| "invalid pubkey hex")?;
    let pk = PublicKey::from_slice(&pk_bytes).map_err(|_| "invalid pubkey bytes")?;

    let msg = Message::from_digest_slice(&msg32).map_err(|_| "invalid message length")?;
    Ok(secp.verify_ecdsa(&msg, &sig, &pk).is_ok())
}

/// Sign a 32-byte digest with a hex private key, returning hex DER.
pub fn sign_digest_hex(secret_hex: &str, msg32: [u8; 32]) -> Result<String, &'static str> {
    let secp = Secp256k1::signing_only();
    let sk_bytes = hex::decode(secret_hex).map_err(|_| "invalid secret key hex")?;
    let sk = SecretKey::from_slice(&sk_bytes).map_err(|_| "invalid secret key bytes")?;
    let msg = Message::from_digest_slice(&msg32).map_err(|_| "invalid message length")?;
    Ok(hex::encode(secp.sign_ecdsa(&msg, &sk).serialize_der()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_roundtrip_verifies() {
        let (sk, pk, addr) = generate_keypair_hex();
        let msg = digest(b"mine window 3");
        let sig = sign_digest_hex(&sk, msg).unwrap();
        assert!(verify_signature_hex(&pk, &sig, msg).unwrap());
        assert_eq!(pubkey_to_address(&pk).unwrap(), Address::new(addr));
        assert_eq!(pubkey_from_secret_hex(&sk).unwrap(), pk);
    }

    #[test]
    fn signature_over_other_payload_fails() {
        let (sk, pk, _) = generate_keypair_hex();
        let sig = sign_digest_hex(&sk, digest(b"a")).unwrap();
        assert!(!verify_signature_hex(&pk, &sig, digest(b"b")).unwrap());
    }

    #[test]
    fn rejects_garbage_pubkey() {
        assert!(pubkey_to_address("zz").is_err());
        assert!(pubkey_to_address("02ab").is_err());
    }
}
