use base64::DecodeError as b64DecodeError;
use openssl::error::ErrorStack as OpenSSLErrorStack;
use serde_json::error::Error as JSONError;

/// Possible failures of a U2F ceremony. Every failure aborts the ceremony
/// it occurred in - no partial registration is created and no counter is
/// advanced.
#[derive(Debug)]
pub enum U2fError {
    /// An application id was not an absolute, path-less http(s) origin URL.
    InvalidAppId,
    /// A facet id (or a client-asserted origin) was not an absolute,
    /// path-less http(s) origin URL.
    InvalidFacetId,
    /// A public key was not a 65 byte uncompressed EC point.
    InvalidPublicKey,
    /// A required client data field was empty or blank.
    ClientDataFieldMissing,
    /// The client data type did not name the ceremony being finished.
    InvalidClientDataType,
    /// The response challenge did not match the challenge this ceremony
    /// was started with.
    MismatchedChallenge,
    /// The client-asserted origin is not among the trusted facets.
    UntrustedOrigin,
    /// The device answered for a different key handle than the one it was
    /// challenged with.
    MismatchedKeyHandle,
    /// The device did not assert user presence.
    UserNotPresent,
    /// The attestation signature did not verify against the attestation
    /// certificate.
    AttestationStatementSigInvalid,
    /// The caller's trust policy rejected the attestation certificate.
    AttestationTrustFailure,
    /// The attestation certificate's public key is not an EC key over
    /// the P-256 curve.
    CertificatePublicKeyInvalid,
    /// The authentication signature did not verify against the device's
    /// registered public key.
    AuthenticationFailure,
    /// The device presented a counter that did not strictly increase.
    /// At least two copies of the device's private key may exist and be
    /// in use in parallel.
    PossibleDeviceCompromise,

    /// An OpenSSL failure during signature or key handling.
    OpenSSLError(OpenSSLErrorStack),
    /// OpenSSL could not name the curve of a certificate's public key.
    OpenSSLErrorNoCurveName,
    /// A base64 field could not be decoded.
    ParseBase64Failure(b64DecodeError),
    /// A JSON structure could not be parsed or serialised.
    ParseJSONFailure(JSONError),
    /// A binary message was shorter than its fixed-size header.
    ParseInsufficentBytesAvailable,
    /// A binary message did not match the registration wire layout.
    ParseNOMFailure,
}
