use crate::utils::{UtilError, gen_random_string};

/// Capability producing unguessable opaque strings for session IDs and CSRF tokens
pub trait TokenGenerator: Send + Sync + 'static {
    /// Return `length` random bytes from a cryptographically secure source, encoded
    /// in a URL-safe alphabet.
    fn random(&self, length: usize) -> Result<String, UtilError>;
}

/// Token generator backed by the operating system CSPRNG (via `ring`)
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureTokenGenerator;

impl TokenGenerator for SecureTokenGenerator {
    fn random(&self, length: usize) -> Result<String, UtilError> {
        gen_random_string(length)
    }
}
