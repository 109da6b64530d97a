// At-rest encryption for node secrets
//
// Sealed values are base64(nonce || ciphertext) using AES-256-GCM with a
// fresh 96-bit nonce per value.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::RngCore;
use thiserror::Error;

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;
const APP_KEY_PREFIX: &str = "base64:";

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid application key: {0}")]
    InvalidKey(String),

    #[error("Failed to encrypt value")]
    Seal,

    #[error("Failed to decrypt value: {0}")]
    Open(String),
}

pub struct Encrypter {
    cipher: Aes256Gcm,
}

impl Encrypter {
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != KEY_LEN {
            return Err(CryptoError::InvalidKey(format!(
                "expected {} bytes, got {}",
                KEY_LEN,
                key.len()
            )));
        }
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { cipher })
    }

    /// Build from an `APP_KEY` value, with or without the `base64:` prefix
    pub fn from_app_key(app_key: &str) -> Result<Self, CryptoError> {
        let encoded = app_key.trim();
        let encoded = encoded.strip_prefix(APP_KEY_PREFIX).unwrap_or(encoded);
        let key = STANDARD
            .decode(encoded)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Self::new(&key)
    }

    /// Generate a new random `APP_KEY` value
    pub fn generate_app_key() -> String {
        let mut key = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        format!("{}{}", APP_KEY_PREFIX, STANDARD.encode(key))
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| CryptoError::Seal)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(sealed))
    }

    pub fn decrypt(&self, sealed: &str) -> Result<String, CryptoError> {
        let data = STANDARD
            .decode(sealed)
            .map_err(|e| CryptoError::Open(e.to_string()))?;
        if data.len() <= NONCE_LEN {
            return Err(CryptoError::Open("payload too short".to_string()));
        }

        let (nonce, ciphertext) = data.split_at(NONCE_LEN);
        let plain = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::Open("authentication failed".to_string()))?;

        String::from_utf8(plain).map_err(|e| CryptoError::Open(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_hides_and_recovers_plaintext() {
        let encrypter = Encrypter::from_app_key(&Encrypter::generate_app_key()).unwrap();
        let sealed = encrypter.encrypt("super-secret-daemon-token").unwrap();

        assert!(!sealed.contains("super-secret"));
        assert_eq!(encrypter.decrypt(&sealed).unwrap(), "super-secret-daemon-token");
    }

    #[test]
    fn test_nonce_is_fresh_per_value() {
        let encrypter = Encrypter::new(&[7u8; 32]).unwrap();
        let a = encrypter.encrypt("same").unwrap();
        let b = encrypter.encrypt("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_key_fails_to_open() {
        let sealed = Encrypter::new(&[1u8; 32]).unwrap().encrypt("token").unwrap();
        let other = Encrypter::new(&[2u8; 32]).unwrap();
        assert!(matches!(other.decrypt(&sealed), Err(CryptoError::Open(_))));
    }

    #[test]
    fn test_app_key_must_be_32_bytes() {
        let short = format!("base64:{}", STANDARD.encode([0u8; 16]));
        assert!(matches!(
            Encrypter::from_app_key(&short),
            Err(CryptoError::InvalidKey(_))
        ));
        assert!(Encrypter::from_app_key("not base64!!").is_err());
    }
}
