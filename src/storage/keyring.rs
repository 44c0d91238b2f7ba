//! Credential Storage
//!
//! Keeps the chat API key in the key-value store encrypted with AES-256-GCM.
//! The 32-byte encryption key lives in `<data dir>/secret.key`, created on
//! first use. Stored form: base64(`nonce[12] || ciphertext || tag`).

use std::path::{Path, PathBuf};

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::rngs::OsRng;
use rand::RngCore;

use super::kv::{KvStore, CREDENTIAL_KEY};
use crate::utils::error::{AppError, AppResult};

const NONCE_SIZE: usize = 12;
const KEY_SIZE: usize = 32;

/// Encrypted credential store for the chat API key
#[derive(Debug, Clone)]
pub struct KeyringService {
    kv: KvStore,
    key_path: PathBuf,
}

impl KeyringService {
    /// Create a credential store whose encryption key lives at `key_path`
    pub fn new(kv: KvStore, key_path: impl Into<PathBuf>) -> Self {
        Self {
            kv,
            key_path: key_path.into(),
        }
    }

    /// Encrypt and store the API key
    pub fn set_api_key(&self, api_key: &str) -> AppResult<()> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(AppError::validation("API key cannot be empty"));
        }
        let cipher = self.cipher(true)?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, api_key.as_bytes())
            .map_err(|e| AppError::keyring(format!("Encryption failed: {}", e)))?;

        let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        self.kv.set(CREDENTIAL_KEY, &BASE64.encode(combined));
        if !self.kv.contains(CREDENTIAL_KEY) {
            return Err(AppError::keyring("Failed to persist API key"));
        }
        tracing::info!("API key stored");
        Ok(())
    }

    /// Retrieve and decrypt the API key, if one is stored
    pub fn get_api_key(&self) -> AppResult<Option<String>> {
        let Some(encoded) = self.kv.get::<Option<String>>(CREDENTIAL_KEY, None) else {
            return Ok(None);
        };
        let data = BASE64
            .decode(encoded.as_bytes())
            .map_err(|e| AppError::keyring(format!("Base64 decode failed: {}", e)))?;
        if data.len() <= NONCE_SIZE {
            return Err(AppError::keyring("Stored API key is corrupted: too short"));
        }

        let cipher = self.cipher(false)?;
        let (nonce_bytes, ciphertext) = data.split_at(NONCE_SIZE);
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| AppError::keyring("Decryption failed: wrong key file or corrupted data"))?;

        String::from_utf8(plaintext)
            .map(Some)
            .map_err(|e| AppError::keyring(format!("Decrypted data is not valid UTF-8: {}", e)))
    }

    /// Delete the stored API key
    pub fn delete_api_key(&self) {
        self.kv.remove(CREDENTIAL_KEY);
        tracing::info!("API key cleared");
    }

    /// Check if an API key is stored
    pub fn has_api_key(&self) -> bool {
        self.kv.contains(CREDENTIAL_KEY)
    }

    /// Healthy when the key file is readable, or can still be created
    pub fn is_healthy(&self) -> bool {
        if self.key_path.exists() {
            read_key_file(&self.key_path).is_ok()
        } else {
            self.key_path
                .parent()
                .map(|dir| dir.exists() || std::fs::create_dir_all(dir).is_ok())
                .unwrap_or(false)
        }
    }

    fn cipher(&self, create: bool) -> AppResult<Aes256Gcm> {
        let key_bytes = if self.key_path.exists() {
            read_key_file(&self.key_path)?
        } else if create {
            create_key_file(&self.key_path)?
        } else {
            return Err(AppError::keyring(format!(
                "Key file missing: {}",
                self.key_path.display()
            )));
        };
        Ok(Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes)))
    }
}

fn read_key_file(path: &Path) -> AppResult<[u8; KEY_SIZE]> {
    let encoded = std::fs::read_to_string(path)?;
    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| AppError::keyring(format!("Key file is not valid base64: {}", e)))?;
    bytes
        .try_into()
        .map_err(|_| AppError::keyring("Key file has the wrong length"))
}

fn create_key_file(path: &Path) -> AppResult<[u8; KEY_SIZE]> {
    let mut key = [0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut key);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, BASE64.encode(key))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    tracing::debug!(path = %path.display(), "created credential key file");
    Ok(key)
}
