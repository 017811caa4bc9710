use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use rand::RngCore;
use tower_sessions::cookie::Key;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Base64 decoding error: {0}")]
    Base64Decode(#[from] base64::DecodeError),
    #[error("Session key must be at least 64 bytes, got {0}")]
    KeyInvalidLength(usize),
}

/// Decodes the configured signing key; padded and unpadded base64 are both accepted.
pub fn from_base64_encoded(secret: &str) -> Result<Key, Error> {
    let bytes = STANDARD_NO_PAD.decode(secret.trim().trim_end_matches('='))?;
    Key::try_from(bytes.as_slice()).map_err(|_| Error::KeyInvalidLength(bytes.len()))
}

/// A throw-away key, sessions signed with it do not survive a restart.
pub fn generate() -> Key {
    let mut bytes = [0u8; 64];
    rand::rng().fill_bytes(&mut bytes);
    Key::from(&bytes)
}
