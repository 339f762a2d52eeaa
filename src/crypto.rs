//! Cryptographic operation wrapper for U2F. This module exists to
//! allow ease of auditing, safe operation wrappers for the library,
//! and cryptographic provider abstraction. This module currently uses
//! OpenSSL as the cryptographic primitive provider.

use openssl::{bn, ec, hash, nid, pkey, sha, sign, x509};
use std::convert::TryFrom;

use crate::error::U2fError;
use crate::proto::PublicKey;

// Why OpenSSL over another rust crate? The openssl crate allows us to
// reconstruct a public key from the raw x/y group coordinates, which is
// exactly the form a U2F device registers its key in, where most others
// want a pkcs formatted structure. It also has the resources and
// investment into its maintenance to trust it with signature checks.

/// The attestation certificate a device supplies during registration,
/// parsed far enough to expose its embedded public key for signature
/// verification. The certificate chain itself is not validated here;
/// trust decisions over the issuer belong to the caller's policy.
pub struct X509PublicKey {
    pubk: x509::X509,
}

impl std::fmt::Debug for X509PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "X509PublicKey")
    }
}

impl TryFrom<&[u8]> for X509PublicKey {
    type Error = U2fError;

    // Must be DER bytes. If you have PEM, base64decode first!
    fn try_from(d: &[u8]) -> Result<Self, Self::Error> {
        let pubk = x509::X509::from_der(d).map_err(|e| U2fError::OpenSSLError(e))?;
        Ok(X509PublicKey { pubk })
    }
}

impl X509PublicKey {
    pub(crate) fn is_secp256r1(&self) -> Result<bool, U2fError> {
        let pk = self
            .pubk
            .public_key()
            .map_err(|e| U2fError::OpenSSLError(e))?;

        let ec_key = pk.ec_key().map_err(|e| U2fError::OpenSSLError(e))?;

        ec_key
            .check_key()
            .map_err(|e| U2fError::OpenSSLError(e))?;

        let ec_grpref = ec_key.group();

        let ec_curve = ec_grpref
            .curve_name()
            .ok_or(U2fError::OpenSSLErrorNoCurveName)?;

        Ok(ec_curve == nid::Nid::X9_62_PRIME256V1)
    }

    pub(crate) fn verify_signature(
        &self,
        signature: &[u8],
        verification_data: &[u8],
    ) -> Result<bool, U2fError> {
        let pkey = self
            .pubk
            .public_key()
            .map_err(|e| U2fError::OpenSSLError(e))?;

        let mut verifier = sign::Verifier::new(hash::MessageDigest::sha256(), &pkey)
            .map_err(|e| U2fError::OpenSSLError(e))?;
        verifier
            .update(verification_data)
            .map_err(|e| U2fError::OpenSSLError(e))?;
        verifier
            .verify(signature)
            .map_err(|e| U2fError::OpenSSLError(e))
    }
}

/// Reconstruct an OpenSSL key from a registered device's public key,
/// validating that the point actually lies on the P-256 curve.
pub(crate) fn pkey_from_public_key(
    pk: &PublicKey,
) -> Result<pkey::PKey<pkey::Public>, U2fError> {
    let ec_group = ec::EcGroup::from_curve_name(nid::Nid::X9_62_PRIME256V1)
        .map_err(|e| U2fError::OpenSSLError(e))?;

    let xbn = bn::BigNum::from_slice(pk.x()).map_err(|e| U2fError::OpenSSLError(e))?;
    let ybn = bn::BigNum::from_slice(pk.y()).map_err(|e| U2fError::OpenSSLError(e))?;

    let ec_key = ec::EcKey::from_public_key_affine_coordinates(&ec_group, &xbn, &ybn)
        .map_err(|e| U2fError::OpenSSLError(e))?;

    ec_key
        .check_key()
        .map_err(|e| U2fError::OpenSSLError(e))?;

    pkey::PKey::from_ec_key(ec_key).map_err(|e| U2fError::OpenSSLError(e))
}

/// Verify an ECDSA signature over `verification_data` with the given key.
pub(crate) fn verify_signature(
    pkey: &pkey::PKey<pkey::Public>,
    signature: &[u8],
    verification_data: &[u8],
) -> Result<bool, U2fError> {
    let mut verifier = sign::Verifier::new(hash::MessageDigest::sha256(), pkey)
        .map_err(|e| U2fError::OpenSSLError(e))?;
    verifier
        .update(verification_data)
        .map_err(|e| U2fError::OpenSSLError(e))?;
    verifier
        .verify(signature)
        .map_err(|e| U2fError::OpenSSLError(e))
}

pub(crate) fn compute_sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = sha::Sha256::new();
    hasher.update(data);
    hasher.finish().to_vec()
}
