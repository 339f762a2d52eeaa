//! An implementation of the U2fConfig trait with no site specific policy:
//! challenges come from the thread rng and device attestation is required.
//! Useful for demo sites, tests and as an example/reference implementation
//! of the U2fConfig trait. Sites with real trust requirements (vendor
//! certificate pinning, HSM-backed randomness) should implement their own
//! config type instead.

use crate::U2fConfig;

/// A U2fConfig implementation carrying only the attestation toggle; every
/// other behaviour is the trait default.
#[derive(Debug, Clone)]
pub struct U2fEphemeralConfig {
    require_attestation: bool,
}

impl U2fEphemeralConfig {
    /// Create a config with the default (mandatory) attestation policy.
    pub fn new() -> Self {
        U2fEphemeralConfig {
            require_attestation: true,
        }
    }

    /// Create a config that skips verification of the device attestation
    /// signature. Only sensible for deployments that must accept
    /// self-attested devices; the rest of the validation chain is
    /// unaffected.
    pub fn without_attestation() -> Self {
        U2fEphemeralConfig {
            require_attestation: false,
        }
    }
}

impl Default for U2fEphemeralConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl U2fConfig for U2fEphemeralConfig {
    /// Whether registrations must carry a verifying attestation signature.
    fn require_attestation(&self) -> bool {
        self.require_attestation
    }
}
