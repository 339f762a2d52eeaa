//! u2f-rs - FIDO U2F for Rust Server Applications
//!
//! U2F (Universal Second Factor) is a challenge-response protocol that binds
//! a hardware authenticator's key pair to an origin, allowing strong,
//! cryptographic second factor authentication to be performed. This library
//! implements the relying party side of the protocol: issuing registration
//! and authentication challenges, decoding the raw messages a device
//! produces, and validating that a response proves possession of a
//! previously registered private key.
//!
//! To use this library yourself, you will want to reference the `U2fConfig`
//! trait to develop site specific policy and configuration, and the `U2f`
//! struct for protocol interactions.
//!
//! The library is stateless: the values returned by the start calls must be
//! persisted by you (generally in the user's session) and supplied back to
//! the matching finish call, and the `DeviceRegistration` produced by a
//! successful registration is yours to store and to present on later
//! authentications.

#![warn(missing_docs)]

extern crate base64;
#[macro_use]
extern crate serde_derive;
extern crate byteorder;
extern crate nom;
extern crate openssl;
extern crate rand;
extern crate url;

mod attestation;
mod base64_data;
pub mod constants;
pub mod crypto;
pub mod ephemeral;
pub mod error;
pub mod proto;

use rand::prelude::*;
use std::convert::TryFrom;

use crate::attestation::verify_registration_attestation;
use crate::constants::{CHALLENGE_SIZE_BYTES, REGISTER_TYPE, SIGN_TYPE, U2F_VERSION};
use crate::crypto::compute_sha256;
use crate::error::U2fError;
use crate::proto::{
    AppId, AttestationCertificate, ClientData, Counter, DeviceRegistration, FacetId, KeyHandle,
    RegisterResponse, RegistrationData, SignResponse, SignatureData,
};

pub use crate::base64_data::Base64UrlSafeData;

/// The in progress state of a registration ceremony. You must persist this
/// associated to the session that requested it; serialised, it is also the
/// exact request message the `u2f.register` client API consumes, so you can
/// relay it to the browser as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartedRegistration {
    /// Protocol version, always `U2F_V2`.
    pub version: String,
    /// The application this ceremony is bound to.
    #[serde(rename = "appId")]
    pub app_id: AppId,
    /// The challenge issued for this ceremony.
    pub challenge: Base64UrlSafeData,
}

/// The in progress state of an authentication ceremony against one
/// registered device. You must persist this associated to the session that
/// requested it; serialised, it is the request message for `u2f.sign`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartedAuthentication {
    /// Protocol version, always `U2F_V2`.
    pub version: String,
    /// The application this ceremony is bound to.
    #[serde(rename = "appId")]
    pub app_id: AppId,
    /// The challenge issued for this ceremony.
    pub challenge: Base64UrlSafeData,
    /// The key handle of the device being challenged.
    #[serde(rename = "keyHandle")]
    pub key_handle: KeyHandle,
}

/// This is the core of the U2F operations. It provides the four interfaces
/// of the protocol:
/// * start_registration
/// * finish_registration
/// * start_authentication
/// * finish_authentication
///
/// The start functions return values that are relayed to the client for the
/// device to answer, and the finish functions receive and verify the
/// device's answer. Each ceremony is independent; the engine holds no state
/// of its own across calls, so a single instance may serve any number of
/// concurrent ceremonies. A failed finish mutates nothing - the caller may
/// simply start again.
#[derive(Debug)]
pub struct U2f<T> {
    config: T,
}

impl<T> U2f<T> {
    /// Create a new U2f instance with the supplied configuration. The config
    /// type provides the challenge randomness and the attestation trust
    /// policy; see the documentation for U2fConfig.
    pub fn new(config: T) -> Self
    where
        T: U2fConfig,
    {
        U2f { config }
    }

    /// Begin a registration ceremony for a new device. Obtains a fresh
    /// challenge from the config and binds it to the application. Has no
    /// side effect beyond consuming randomness; discarding the returned
    /// state abandons the ceremony without a trace.
    pub fn start_registration(&self, app_id: &AppId) -> StartedRegistration
    where
        T: U2fConfig,
    {
        let challenge = self.config.generate_challenge();
        StartedRegistration {
            version: U2F_VERSION.to_string(),
            app_id: app_id.clone(),
            challenge: Base64UrlSafeData(challenge),
        }
    }

    /// Process a device's answer to a registration challenge. On success
    /// this returns a new DeviceRegistration with a counter of zero, which
    /// you must persist and associate with the user; the engine never
    /// stores it. Any failure aborts the ceremony with nothing created.
    pub fn finish_registration(
        &self,
        state: &StartedRegistration,
        rsp: &RegisterResponse,
        trusted_facets: &[FacetId],
    ) -> Result<DeviceRegistration, U2fError>
    where
        T: U2fConfig,
    {
        let client_data_bytes: &[u8] = rsp.client_data.as_ref();
        let client_data = ClientData::from_slice(client_data_bytes)?;
        client_data.validate()?;

        // Verify that the type names a registration ceremony.
        if client_data.typ != REGISTER_TYPE {
            return Err(U2fError::InvalidClientDataType);
        }

        // Verify that the challenge matches the challenge that was issued
        // when this ceremony was started.
        verify_challenge(&client_data, &state.challenge)?;

        // Verify that the asserted origin is one of the trusted facets.
        verify_origin(&client_data, trusted_facets)?;

        // Decode the device's raw registration message.
        let registration_data = RegistrationData::try_from(rsp.registration_data.as_ref())?;

        // Verify the attestation signature over the registration: proof
        // that the key pair was minted by the device the attestation
        // certificate describes. The signed message binds the application,
        // the exact client data, the key handle and the new public key.
        if self.config.require_attestation() {
            let app_id_hash = compute_sha256(state.app_id.as_ref().as_bytes());
            let client_data_hash = compute_sha256(client_data_bytes);
            verify_registration_attestation(&registration_data, &app_id_hash, &client_data_hash)?;
        } else {
            log::debug!("attestation signature verification disabled by config");
        }

        // Let the site policy decide whether this device's certificate is
        // trusted, e.g. against pinned vendor roots.
        self.config
            .policy_verify_trust(&registration_data.attestation_cert)
            .map_err(|_| U2fError::AttestationTrustFailure)?;

        let RegistrationData {
            public_key,
            key_handle,
            attestation_cert,
            signature: _,
        } = registration_data;

        Ok(DeviceRegistration::new(
            key_handle,
            public_key,
            attestation_cert,
            0,
        ))
    }

    /// Begin an authentication ceremony against a previously registered
    /// device. Obtains a fresh challenge and addresses it to the device's
    /// key handle.
    pub fn start_authentication(
        &self,
        app_id: &AppId,
        registration: &DeviceRegistration,
    ) -> StartedAuthentication
    where
        T: U2fConfig,
    {
        let challenge = self.config.generate_challenge();
        StartedAuthentication {
            version: U2F_VERSION.to_string(),
            app_id: app_id.clone(),
            challenge: Base64UrlSafeData(challenge),
            key_handle: registration.key_handle().clone(),
        }
    }

    /// Process a device's answer to an authentication challenge. On success
    /// the registration's counter has been advanced as an observable side
    /// effect - persist the updated registration - and the new counter
    /// value is returned. On any failure the registration is untouched.
    pub fn finish_authentication(
        &self,
        state: &StartedAuthentication,
        rsp: &SignResponse,
        trusted_facets: &[FacetId],
        registration: &mut DeviceRegistration,
    ) -> Result<Counter, U2fError>
    where
        T: U2fConfig,
    {
        let client_data_bytes: &[u8] = rsp.client_data.as_ref();
        let client_data = ClientData::from_slice(client_data_bytes)?;
        client_data.validate()?;

        // Verify that the type names an authentication ceremony.
        if client_data.typ != SIGN_TYPE {
            return Err(U2fError::InvalidClientDataType);
        }

        verify_challenge(&client_data, &state.challenge)?;

        verify_origin(&client_data, trusted_facets)?;

        // The device must answer for the key handle it was challenged with.
        if rsp.key_handle != state.key_handle {
            return Err(U2fError::MismatchedKeyHandle);
        }

        // Decode the device's raw signature message.
        let signature_data = SignatureData::try_from(rsp.signature_data.as_ref())?;

        if !signature_data.user_present() {
            return Err(U2fError::UserNotPresent);
        }

        // The signed message is
        //   SHA-256(appId) || userPresence || counter (big endian) || SHA-256(clientData)
        let app_id_hash = compute_sha256(state.app_id.as_ref().as_bytes());
        let client_data_hash = compute_sha256(client_data_bytes);
        let counter_bytes = signature_data.counter.to_be_bytes();

        let verification_data: Vec<u8> = app_id_hash
            .iter()
            .chain(std::iter::once(&signature_data.user_presence))
            .chain(counter_bytes.iter())
            .chain(client_data_hash.iter())
            .map(|b| *b)
            .collect();

        let pkey = crypto::pkey_from_public_key(registration.public_key())?;
        let verified = crypto::verify_signature(
            &pkey,
            signature_data.signature.as_bytes(),
            &verification_data,
        )?;

        if !verified {
            return Err(U2fError::AuthenticationFailure);
        }

        // A counter that does not strictly increase is the replay signal:
        // reject the ceremony even though the signature itself verified.
        registration.update_counter(signature_data.counter)?;

        Ok(signature_data.counter)
    }
}

// The comparison is on decoded bytes, so encoding variants of the same
// challenge text cannot slip through.
fn verify_challenge(
    client_data: &ClientData,
    issued: &Base64UrlSafeData,
) -> Result<(), U2fError> {
    let presented = Base64UrlSafeData::try_from(client_data.challenge.as_str())
        .map_err(U2fError::ParseBase64Failure)?;
    if presented != *issued {
        return Err(U2fError::MismatchedChallenge);
    }
    Ok(())
}

fn verify_origin(client_data: &ClientData, trusted_facets: &[FacetId]) -> Result<(), U2fError> {
    let origin = FacetId::new(&client_data.origin)?;
    if !trusted_facets.contains(&origin) {
        log::debug!("origin {} is not a trusted facet", origin);
        return Err(U2fError::UntrustedOrigin);
    }
    Ok(())
}

/// The U2fConfig type allows site-specific customisation of the library:
/// where challenge randomness comes from, and what attestation policy
/// newly registered devices are held to. The defaults are sound for most
/// deployments.
pub trait U2fConfig {
    /// Produce the random challenge for a single ceremony. Called exactly
    /// once per start call. The default implementation draws 32 bytes from
    /// the thread csprng; override this only if your deployment sources
    /// randomness elsewhere (e.g. an HSM).
    fn generate_challenge(&self) -> Vec<u8> {
        let mut rng = rand::thread_rng();
        rng.gen::<[u8; CHALLENGE_SIZE_BYTES]>().to_vec()
    }

    /// Whether the attestation signature of a registration response must
    /// verify against the device's attestation certificate. Defaults to
    /// true, and you should leave it there: disabling this accepts devices
    /// that cannot prove which vendor minted their keys. It exists for
    /// deployments that must accept self-attested devices. The rest of
    /// the validation chain is unaffected by this setting.
    fn require_attestation(&self) -> bool {
        true
    }

    /// A callback to allow trust decisions to be made over the attestation
    /// certificate of a device that is registering, e.g. matching its
    /// issuer against vendor roots you trust. Runs after the attestation
    /// signature has been verified; returning Err fails the ceremony. The
    /// default implementation trusts any certificate whose signature
    /// verified.
    fn policy_verify_trust(&self, attestation_cert: &AttestationCertificate) -> Result<(), ()> {
        log::debug!("policy_verify_trust -> {:?}", attestation_cert);
        Ok(())
    }
}
