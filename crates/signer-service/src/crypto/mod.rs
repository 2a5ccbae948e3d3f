use crate::errors::SignerError;
use common::jwt::MAX_JWT_SIZE_BYTES;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use ring::{
    aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN},
    rand::{SecureRandom, SystemRandom},
};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::RsaPrivateKey;
use serde::Serialize;
use tracing::instrument;

/// RSA modulus size for signing keys.
pub const RSA_KEY_BITS: usize = 2048;

/// AES-256-GCM key length.
const MASTER_KEY_LEN: usize = 32;

/// AES-256-GCM authentication tag length.
const TAG_LEN: usize = 16;

/// Freshly generated key pair.
pub struct GeneratedKey {
    /// PKCS#8 DER private key.
    pub private_der: Vec<u8>,
    /// SPKI PEM public key.
    pub public_pem: String,
}

/// Generate an RSA-2048 key pair using the OS CSPRNG.
///
/// CPU-bound (tens to hundreds of milliseconds); async callers should run
/// it on the blocking pool.
#[instrument(skip_all)]
pub fn generate_signing_key() -> Result<GeneratedKey, SignerError> {
    let private_key = RsaPrivateKey::new(&mut OsRng, RSA_KEY_BITS)
        .map_err(|e| SignerError::Crypto(format!("Keypair generation failed: {}", e)))?;

    let private_der = private_key
        .to_pkcs8_der()
        .map_err(|e| SignerError::Crypto(format!("Private key encoding failed: {}", e)))?
        .as_bytes()
        .to_vec();

    let public_pem = private_key
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| SignerError::Crypto(format!("Public key encoding failed: {}", e)))?;

    Ok(GeneratedKey {
        private_der,
        public_pem,
    })
}

/// Decode PKCS#8 DER private key material into a signing key.
///
/// Failure means the persisted material is corrupt, not that it is absent.
#[instrument(skip_all)]
pub fn decode_private_key(private_der: &[u8]) -> Result<EncodingKey, SignerError> {
    let private_key = RsaPrivateKey::from_pkcs8_der(private_der)
        .map_err(|e| SignerError::KeyCorrupt(format!("Invalid private key: {}", e)))?;

    // jsonwebtoken takes RSA keys as PKCS#1 DER
    let pkcs1 = private_key
        .to_pkcs1_der()
        .map_err(|e| SignerError::KeyCorrupt(format!("Private key re-encoding failed: {}", e)))?;

    Ok(EncodingKey::from_rsa_der(pkcs1.as_bytes()))
}

/// Sign claims with RS256, setting `kid` in the header.
#[instrument(skip_all)]
pub fn sign_jwt<T: Serialize>(
    claims: &T,
    encoding_key: &EncodingKey,
    key_id: &str,
) -> Result<String, SignerError> {
    let mut header = Header::new(Algorithm::RS256);
    header.typ = Some("JWT".to_string());
    header.kid = Some(key_id.to_string());

    encode(&header, claims, encoding_key)
        .map_err(|e| SignerError::Crypto(format!("JWT signing operation failed: {}", e)))
}

/// Verify an RS256 token against a PEM public key and return its claims.
///
/// Checks signature, `exp` and `nbf`. Audience is left to the relying
/// party. Oversized tokens are rejected before parsing.
#[instrument(skip_all)]
pub fn verify_token(token: &str, public_key_pem: &str) -> Result<serde_json::Value, SignerError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        return Err(SignerError::Crypto("Token exceeds maximum size".to_string()));
    }

    let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
        .map_err(|e| SignerError::Crypto(format!("Invalid public key: {}", e)))?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.validate_aud = false;

    let token_data = decode::<serde_json::Value>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(target: "crypto", error = %e, "Token verification failed");
        SignerError::Crypto(format!("Token verification failed: {}", e))
    })?;

    Ok(token_data.claims)
}

/// Encrypt a value with AES-256-GCM.
///
/// Output layout: 96-bit nonce, ciphertext, 128-bit tag.
#[instrument(skip_all)]
pub fn seal(plaintext: &[u8], master_key: &[u8]) -> Result<Vec<u8>, SignerError> {
    let key = aead_key(master_key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|e| SignerError::Crypto(format!("Nonce generation failed: {}", e)))?;

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::empty(),
        &mut in_out,
    )
    .map_err(|e| SignerError::Crypto(format!("Encryption operation failed: {}", e)))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + in_out.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&in_out);
    Ok(sealed)
}

/// Decrypt a value produced by [`seal`].
#[instrument(skip_all)]
pub fn unseal(sealed: &[u8], master_key: &[u8]) -> Result<Vec<u8>, SignerError> {
    let key = aead_key(master_key)?;

    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(SignerError::Crypto(format!(
            "Sealed value too short: {} bytes",
            sealed.len()
        )));
    }

    let (nonce_part, ciphertext) = sealed.split_at(NONCE_LEN);
    let nonce_bytes: [u8; NONCE_LEN] = nonce_part
        .try_into()
        .map_err(|e| SignerError::Crypto(format!("Invalid nonce format: {}", e)))?;

    let mut in_out = ciphertext.to_vec();
    let plaintext = key
        .open_in_place(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::empty(),
            &mut in_out,
        )
        .map_err(|e| SignerError::Crypto(format!("Decryption operation failed: {}", e)))?;

    Ok(plaintext.to_vec())
}

fn aead_key(master_key: &[u8]) -> Result<LessSafeKey, SignerError> {
    if master_key.len() != MASTER_KEY_LEN {
        return Err(SignerError::Crypto(format!(
            "Invalid master key length: {} (expected {})",
            master_key.len(),
            MASTER_KEY_LEN
        )));
    }

    let unbound_key = UnboundKey::new(&AES_256_GCM, master_key)
        .map_err(|e| SignerError::Crypto(format!("Cipher key creation failed: {}", e)))?;
    Ok(LessSafeKey::new(unbound_key))
}
