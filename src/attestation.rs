//! Attestation verification procedure for registration responses. The
//! device signs its newly generated key with the key of its attestation
//! certificate; verifying that signature proves the key pair was minted
//! by the device the certificate describes. Trust in the certificate
//! itself is a separate decision, made through the U2fConfig trait.

use std::convert::TryFrom;

use crate::crypto;
use crate::error::U2fError;
use crate::proto::RegistrationData;

// https://fidoalliance.org/specs/fido-u2f-v1.2-ps-20170411/fido-u2f-raw-message-formats-v1.2-ps-20170411.html#registration-response-message-success
pub(crate) fn verify_registration_attestation(
    data: &RegistrationData,
    app_id_hash: &[u8],
    client_data_hash: &[u8],
) -> Result<(), U2fError> {
    let certificate_public_key =
        crypto::X509PublicKey::try_from(data.attestation_cert.as_bytes())?;

    // If certificate public key is not an Elliptic Curve (EC) public key
    // over the P-256 curve, terminate this algorithm and return an
    // appropriate error.
    if !(certificate_public_key.is_secp256r1()?) {
        return Err(U2fError::CertificatePublicKeyInvalid);
    }

    // Let verificationData be the concatenation of
    // (0x00 || applicationParameter || challengeParameter || keyHandle || userPublicKey)
    let r: [u8; 1] = [0x00];
    let verification_data: Vec<u8> = r
        .iter()
        .chain(app_id_hash.iter())
        .chain(client_data_hash.iter())
        .chain(data.key_handle.as_bytes().iter())
        .chain(data.public_key.as_bytes().iter())
        .map(|b| *b)
        .collect();

    // Verify the sig using verificationData and certificate public key.
    let verified =
        certificate_public_key.verify_signature(data.signature.as_bytes(), &verification_data)?;

    if !verified {
        log::debug!("attestation signature verification failed");
        return Err(U2fError::AttestationStatementSigInvalid);
    }

    Ok(())
}
