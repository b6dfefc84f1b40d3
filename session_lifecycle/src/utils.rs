use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use ring::rand::SecureRandom;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Invalid format: {0}")]
    Format(String),
}

pub(crate) fn base64url_encode(input: Vec<u8>) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Draw `len` bytes from the system CSPRNG and encode them as base64url without padding
pub(crate) fn gen_random_string(len: usize) -> Result<String, UtilError> {
    if len == 0 {
        return Err(UtilError::Format(
            "Random string length must be positive".to_string(),
        ));
    }
    let rng = ring::rand::SystemRandom::new();
    let mut buf = vec![0u8; len];
    rng.fill(&mut buf)
        .map_err(|_| UtilError::Crypto("Failed to generate random string".to_string()))?;
    Ok(base64url_encode(buf))
}

/// Shorten an identifier for logging so full session IDs never reach the logs
pub(crate) fn redact_id(id: &str) -> String {
    let prefix: String = id.chars().take(6).collect();
    if prefix.len() < id.len() {
        format!("{prefix}…")
    } else {
        prefix
    }
}
