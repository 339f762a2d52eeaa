//! Implementations of the U2F protocol value types and wire structures
//! that can be json encoded and used by other applications, plus the
//! decoders for the raw binary messages a device produces.

use std::convert::TryFrom;
use std::fmt;

use byteorder::{BigEndian, ByteOrder};
use serde::de::Unexpected;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use crate::base64_data::Base64UrlSafeData;
use crate::constants::{
    PUBLIC_KEY_LEN, REGISTRATION_RESERVED_BYTE, UNCOMPRESSED_POINT_PREFIX, USER_PRESENT_FLAG,
};
use crate::error::U2fError;

/// A per-device usage counter. Devices increment this on every signing
/// operation; a counter that fails to increase reveals a cloned key.
pub type Counter = u32;

// The application and facet identities are both path-less origin URLs.
// Canonical form is scheme://host[:port] - lowercased scheme and host,
// default port elided, no trailing slash - so equality on the canonical
// string is exact origin equality.
fn canonical_origin(s: &str) -> Option<String> {
    let url = Url::parse(s).ok()?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return None,
    }
    url.host_str()?;
    if !url.path().is_empty() && url.path() != "/" {
        return None;
    }
    if url.query().is_some() || url.fragment().is_some() {
        return None;
    }

    Some(url.as_str().trim_end_matches('/').to_string())
}

/// The identity of the relying party: an absolute http(s) URL with no
/// path, e.g. `https://site.example` or `http://localhost:8080`. A
/// malformed input is a construction failure; an AppId never exists in a
/// partially valid state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppId(String);

impl AppId {
    /// Parse and canonicalise an application id.
    pub fn new(app_id: &str) -> Result<AppId, U2fError> {
        canonical_origin(app_id)
            .map(AppId)
            .ok_or(U2fError::InvalidAppId)
    }
}

impl TryFrom<&str> for AppId {
    type Error = U2fError;

    fn try_from(app_id: &str) -> Result<AppId, U2fError> {
        AppId::new(app_id)
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for AppId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for AppId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AppId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        AppId::new(&s).map_err(|_| {
            serde::de::Error::invalid_value(
                Unexpected::Str(&s),
                &"a path-less http(s) origin URL",
            )
        })
    }
}

/// An origin trusted by the caller to complete a ceremony on behalf of an
/// application. Same shape and canonical form as [AppId]; the asserted
/// origin of a finishing ceremony must exactly equal one of the trusted
/// facets supplied to that finish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetId(String);

impl FacetId {
    /// Parse and canonicalise a facet id.
    pub fn new(facet_id: &str) -> Result<FacetId, U2fError> {
        canonical_origin(facet_id)
            .map(FacetId)
            .ok_or(U2fError::InvalidFacetId)
    }
}

impl From<&AppId> for FacetId {
    // An application is always trusted to speak for itself.
    fn from(app_id: &AppId) -> FacetId {
        FacetId(app_id.0.clone())
    }
}

impl fmt::Display for FacetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for FacetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for FacetId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FacetId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FacetId::new(&s).map_err(|_| {
            serde::de::Error::invalid_value(
                Unexpected::Str(&s),
                &"a path-less http(s) origin URL",
            )
        })
    }
}

/// An opaque authenticator-issued reference to a device-held private key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyHandle(pub Base64UrlSafeData);

impl KeyHandle {
    /// The raw key handle bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl From<&[u8]> for KeyHandle {
    fn from(data: &[u8]) -> KeyHandle {
        KeyHandle(Base64UrlSafeData(data.to_vec()))
    }
}

/// A device-issued certificate asserting the authenticity of a generated
/// key pair, held as an opaque DER blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationCertificate(pub Base64UrlSafeData);

impl AttestationCertificate {
    /// The DER bytes of the certificate.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_ref()
    }
}

/// A raw ECDSA signature produced by a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(pub Base64UrlSafeData);

impl Signature {
    /// The DER encoded signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_ref()
    }
}

/// The public key a device registers: a raw ANSI X9.62 uncompressed point
/// on P-256, 65 bytes with an 0x04 prefix. Structurally validated at
/// construction; that the point lies on the curve is checked when the key
/// is used for verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicKey(Base64UrlSafeData);

impl PublicKey {
    /// The raw 65 point bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    pub(crate) fn x(&self) -> &[u8] {
        &self.as_bytes()[1..33]
    }

    pub(crate) fn y(&self) -> &[u8] {
        &self.as_bytes()[33..65]
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = U2fError;

    fn try_from(d: &[u8]) -> Result<PublicKey, U2fError> {
        if d.len() != PUBLIC_KEY_LEN || d[0] != UNCOMPRESSED_POINT_PREFIX {
            return Err(U2fError::InvalidPublicKey);
        }
        Ok(PublicKey(Base64UrlSafeData(d.to_vec())))
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let data = Base64UrlSafeData::deserialize(deserializer)?;
        PublicKey::try_from(data.as_ref()).map_err(|_| {
            serde::de::Error::invalid_value(
                Unexpected::Bytes(data.as_ref()),
                &"a 65 byte uncompressed EC point",
            )
        })
    }
}

/// The client-collected data a device signs over: the ceremony type, the
/// challenge as web-safe base64 text, and the asserted origin. The json
/// key for the type really is `typ` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientData {
    /// Ceremony type constant.
    pub typ: String,
    /// The challenge, as the web-safe base64 text the client received.
    pub challenge: String,
    /// The origin the client asserts the ceremony was performed on.
    pub origin: String,
}

impl ClientData {
    pub(crate) fn from_slice(data: &[u8]) -> Result<ClientData, U2fError> {
        serde_json::from_slice(data).map_err(U2fError::ParseJSONFailure)
    }

    /// Structural validation: every field must be present and non-blank.
    /// No cryptographic or network work happens here.
    pub fn validate(&self) -> Result<(), U2fError> {
        if self.typ.trim().is_empty()
            || self.challenge.trim().is_empty()
            || self.origin.trim().is_empty()
        {
            return Err(U2fError::ClientDataFieldMissing);
        }
        Ok(())
    }
}

/// The message a client returns from `u2f.register`, as deserialised from
/// the caller's transport layer. Both payload fields are base64 blobs;
/// `client_data` holds the exact bytes the device signed over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// The raw registration message produced by the device.
    #[serde(rename = "registrationData")]
    pub registration_data: Base64UrlSafeData,
    /// The client data bytes the device signed over.
    #[serde(rename = "clientData")]
    pub client_data: Base64UrlSafeData,
    /// Version string some client libraries echo back. Not validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// The message a client returns from `u2f.sign`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignResponse {
    /// The key handle the device answered for.
    #[serde(rename = "keyHandle")]
    pub key_handle: KeyHandle,
    /// The raw signature message produced by the device.
    #[serde(rename = "signatureData")]
    pub signature_data: Base64UrlSafeData,
    /// The client data bytes the device signed over.
    #[serde(rename = "clientData")]
    pub client_data: Base64UrlSafeData,
}

// The raw registration message has no length prefix for its trailing
// signature; the attestation certificate is delimited by its own DER
// header instead. Layout:
//
// Bytes  Value
// 1      0x05 (reserved)
// 65     public key
// 1      key handle length
// *      key handle
// ASN.1  attestation certificate
// *      attestation signature

/// The decoded contents of a device's raw registration message.
#[derive(Debug, Clone)]
pub struct RegistrationData {
    /// The public key of the newly generated key pair.
    pub public_key: PublicKey,
    /// The handle the device uses to reference the private key.
    pub key_handle: KeyHandle,
    /// The attestation certificate, DER, exactly as sent.
    pub attestation_cert: AttestationCertificate,
    /// The attestation signature over the registration.
    pub signature: Signature,
}

// Extract a DER SEQUENCE (tag + definite length + content) from the head
// of the input. Certificates over 127 bytes - i.e. all of them - use the
// long length form, so both forms are handled; an indefinite length
// (0x80) is not DER and is rejected, as are length fields above 4 octets.
fn der_sequence(i: &[u8]) -> nom::IResult<&[u8], &[u8]> {
    if i.len() < 2 {
        return Err(nom::Err::Failure(nom::error::Error::new(
            i,
            nom::error::ErrorKind::LengthValue,
        )));
    }
    if i[0] != 0x30 {
        // Not an ASN.1 sequence.
        return Err(nom::Err::Failure(nom::error::Error::new(
            i,
            nom::error::ErrorKind::IsNot,
        )));
    }

    let (header_len, content_len) = if i[1] & 0x80 == 0 {
        (2, i[1] as usize)
    } else {
        let len_octets = (i[1] & 0x7f) as usize;
        if len_octets == 0 || len_octets > 4 || i.len() < 2 + len_octets {
            return Err(nom::Err::Failure(nom::error::Error::new(
                i,
                nom::error::ErrorKind::LengthValue,
            )));
        }
        let mut content_len: usize = 0;
        for octet in &i[2..2 + len_octets] {
            content_len = (content_len << 8) | *octet as usize;
        }
        (2 + len_octets, content_len)
    };

    if i.len() < header_len + content_len {
        // Not enough bytes to satisfy the declared length.
        return Err(nom::Err::Failure(nom::error::Error::new(
            i,
            nom::error::ErrorKind::Eof,
        )));
    }

    let (cert, rem) = i.split_at(header_len + content_len);
    Ok((rem, cert))
}

fn registration_data_parser(i: &[u8]) -> nom::IResult<&[u8], (&[u8], &[u8], &[u8], &[u8])> {
    let (i, _) = nom::combinator::verify(nom::bytes::complete::take(1usize), |val: &[u8]| {
        val == [REGISTRATION_RESERVED_BYTE]
    })(i)?;
    let (i, public_key) = nom::bytes::complete::take(PUBLIC_KEY_LEN)(i)?;
    let (i, key_handle) = nom::multi::length_data(nom::number::complete::be_u8)(i)?;
    let (i, att_cert) = der_sequence(i)?;
    let (i, signature) = nom::combinator::rest(i)?;

    Ok((i, (public_key, key_handle, att_cert, signature)))
}

impl TryFrom<&[u8]> for RegistrationData {
    type Error = U2fError;

    fn try_from(data: &[u8]) -> Result<RegistrationData, U2fError> {
        let (_, (public_key, key_handle, att_cert, signature)) =
            registration_data_parser(data).map_err(|_| U2fError::ParseNOMFailure)?;

        Ok(RegistrationData {
            public_key: PublicKey::try_from(public_key)?,
            key_handle: KeyHandle::from(key_handle),
            attestation_cert: AttestationCertificate(Base64UrlSafeData(att_cert.to_vec())),
            signature: Signature(Base64UrlSafeData(signature.to_vec())),
        })
    }
}

/// The decoded contents of a device's raw authentication message.
#[derive(Debug, Clone)]
pub struct SignatureData {
    /// The user presence byte, bit 0 set if a user touched the device.
    pub user_presence: u8,
    /// The device's usage counter at signing time.
    pub counter: Counter,
    /// The assertion signature.
    pub signature: Signature,
}

impl SignatureData {
    pub(crate) fn user_present(&self) -> bool {
        self.user_presence & USER_PRESENT_FLAG != 0
    }
}

impl TryFrom<&[u8]> for SignatureData {
    type Error = U2fError;

    // [ user presence: u8 | counter: u32 big endian | signature: rest ]
    fn try_from(data: &[u8]) -> Result<SignatureData, U2fError> {
        if data.len() < 5 {
            return Err(U2fError::ParseInsufficentBytesAvailable);
        }

        let counter = BigEndian::read_u32(&data[1..5]);

        Ok(SignatureData {
            user_presence: data[0],
            counter,
            signature: Signature(Base64UrlSafeData(data[5..].to_vec())),
        })
    }
}

/// A single enrolled authenticator, created once by a successful
/// registration ceremony. You must persist this associated to the user it
/// was registered for; the library never stores it. The counter may only
/// move through [DeviceRegistration::update_counter], so a loaded and
/// stored registration always satisfies the strictly-increasing counter
/// invariant. Callers running concurrent ceremonies for the same device
/// must serialise counter updates at their persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRegistration {
    key_handle: KeyHandle,
    public_key: PublicKey,
    attestation_cert: AttestationCertificate,
    counter: Counter,
}

impl DeviceRegistration {
    /// Assemble a registration from its parts, e.g. when migrating from
    /// another credential store.
    pub fn new(
        key_handle: KeyHandle,
        public_key: PublicKey,
        attestation_cert: AttestationCertificate,
        counter: Counter,
    ) -> DeviceRegistration {
        DeviceRegistration {
            key_handle,
            public_key,
            attestation_cert,
            counter,
        }
    }

    /// The handle the device uses to reference its private key.
    pub fn key_handle(&self) -> &KeyHandle {
        &self.key_handle
    }

    /// The device's registered public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The attestation certificate captured at registration.
    pub fn attestation_cert(&self) -> &AttestationCertificate {
        &self.attestation_cert
    }

    /// The highest usage counter this device has proven so far.
    pub fn counter(&self) -> Counter {
        self.counter
    }

    /// Advance the usage counter. The new value must be strictly greater
    /// than the stored one; anything else is the replay signal and fails
    /// without mutating the registration. Unsigned comparison with no
    /// wraparound tolerance - a device whose counter ever reaches the
    /// maximum can no longer authenticate.
    pub fn update_counter(&mut self, client_counter: Counter) -> Result<(), U2fError> {
        if client_counter <= self.counter {
            return Err(U2fError::PossibleDeviceCompromise);
        }
        self.counter = client_counter;
        Ok(())
    }

    /// Serialise for persistence. Binary fields are stored in their
    /// web-safe base64 wire encoding, the counter as a plain integer.
    pub fn to_json(&self) -> Result<String, U2fError> {
        serde_json::to_string(self).map_err(U2fError::ParseJSONFailure)
    }

    /// The inverse of [DeviceRegistration::to_json]; round trips exactly.
    pub fn from_json(json: &str) -> Result<DeviceRegistration, U2fError> {
        serde_json::from_str(json).map_err(U2fError::ParseJSONFailure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A registration message captured from a real token, attestation
    // certificate with a long form (0x82) DER length.
    const REGISTRATION_DATA: &str = "BQR0Dx3Zy4fY74xfS0wZI9FkzFttiNA_FOODMfYCCh2Xpx3126fko3zBGwytGzrDmQn3VzgEG-izO0kmd8kNps1qQIIaAarqUF4CARQYqaTFBII2eqciJpQvqs2hrpEnthHIS_ew-ufy25X4SUQaPRPrgRDmGoSYKHICgVJiOqp1ztMwggE0MIHboAMCAQICCmLqA072q-X-8BMwCgYIKoZIzj0EAwIwFTETMBEGA1UEAxMKVTJGIElzc3VlcjAaFwswMDAxMDEwMDAwWhcLMDAwMTAxMDAwMFowFTETMBEGA1UEAxMKVTJGIERldmljZTBZMBMGByqGSM49AgEGCCqGSM49AwEHA0IABMwMTq_COwMSIZUJeXsEydPmpFSVMbYaRwcJ3sOM4UMTpg321lv_2SlORsTzFsofAocqp9e0QmMOwBA7xVO4pgWjFzAVMBMGCysGAQQBguUcAgEBBAQDAgQwMAoGCCqGSM49BAMCA0gAMEUCIQDBo6aOLxanIUYnBX9iu3KMngPnobpi0EZSTkVtLC8_cwIgC1945RGqGBKfbyNtkhMifZK05n7fU-gW37Bdnci5D94wRgIhALZYojvL3pUHuCsPggtHU7qXtVPYo0SaE4lSsJ-Zi3VOAiEAvwdx-wjfiqL-ugl5N5LeCxwGtvqrSjmRD1YDt9fe5Gw";

    fn registration_blob() -> Vec<u8> {
        base64::decode_config(REGISTRATION_DATA, base64::URL_SAFE_NO_PAD).unwrap()
    }

    #[test]
    fn parse_registration_data() {
        let blob = registration_blob();
        let data = RegistrationData::try_from(blob.as_slice()).unwrap();

        // Field boundaries, derived from the blob itself: a 64 byte key
        // handle, then a certificate of 308 content bytes + 4 header.
        let kh_len = blob[66] as usize;
        assert_eq!(kh_len, 64);
        let cert_start = 67 + kh_len;
        assert_eq!(&blob[cert_start..cert_start + 4], &[0x30, 0x82, 0x01, 0x34]);
        let cert_end = cert_start + 4 + 308;

        assert_eq!(data.public_key.as_bytes(), &blob[1..66]);
        assert_eq!(data.key_handle.as_bytes(), &blob[67..67 + kh_len]);
        assert_eq!(data.attestation_cert.as_bytes(), &blob[cert_start..cert_end]);
        assert_eq!(data.signature.as_bytes(), &blob[cert_end..]);
    }

    #[test]
    fn parse_registration_data_rejects_bad_reserved_byte() {
        let mut blob = registration_blob();
        blob[0] = 0x06;
        assert!(matches!(
            RegistrationData::try_from(blob.as_slice()),
            Err(U2fError::ParseNOMFailure)
        ));
    }

    #[test]
    fn parse_registration_data_rejects_truncation() {
        let blob = registration_blob();
        // Shorter than the fixed header, mid key handle, mid certificate,
        // mid certificate header.
        for len in [0, 1, 34, 66, 67, 100, 133, 200].iter() {
            assert!(matches!(
                RegistrationData::try_from(&blob[..*len]),
                Err(U2fError::ParseNOMFailure)
            ));
        }
    }

    #[test]
    fn der_sequence_lengths() {
        // Short form.
        let (rem, cert) = der_sequence(&[0x30, 0x03, 1, 2, 3, 0xaa]).unwrap();
        assert_eq!(cert, &[0x30, 0x03, 1, 2, 3]);
        assert_eq!(rem, &[0xaa]);

        // Long form, one and two length octets.
        let mut buf = vec![0x30, 0x81, 0x80];
        buf.extend(std::iter::repeat(0u8).take(0x80));
        buf.push(0xbb);
        let (rem, cert) = der_sequence(&buf).unwrap();
        assert_eq!(cert.len(), 3 + 0x80);
        assert_eq!(rem, &[0xbb]);

        let mut buf = vec![0x30, 0x82, 0x01, 0x00];
        buf.extend(std::iter::repeat(0u8).take(0x100));
        let (rem, cert) = der_sequence(&buf).unwrap();
        assert_eq!(cert.len(), 4 + 0x100);
        assert!(rem.is_empty());

        // Not a sequence, indefinite length, oversized length field,
        // truncated content.
        assert!(der_sequence(&[0x31, 0x01, 0x00]).is_err());
        assert!(der_sequence(&[0x30, 0x80, 0x00, 0x00]).is_err());
        assert!(der_sequence(&[0x30, 0x85, 0x01, 0x01, 0x01, 0x01, 0x01]).is_err());
        assert!(der_sequence(&[0x30, 0x05, 1, 2]).is_err());
        assert!(der_sequence(&[0x30]).is_err());
    }

    #[test]
    fn parse_signature_data() {
        let data =
            SignatureData::try_from([0x01, 0x00, 0x00, 0x00, 0x05, 0xaa, 0xbb].as_ref()).unwrap();
        assert_eq!(data.user_presence, 1);
        assert!(data.user_present());
        assert_eq!(data.counter, 5);
        assert_eq!(data.signature.as_bytes(), &[0xaa, 0xbb]);

        // Counter is big endian regardless of host order.
        let data =
            SignatureData::try_from([0x00, 0x01, 0x00, 0x00, 0x00].as_ref()).unwrap();
        assert_eq!(data.counter, 0x0100_0000);
        assert!(!data.user_present());
        assert!(data.signature.as_bytes().is_empty());

        for short in [&[][..], &[0x01][..], &[0x01, 0x00, 0x00, 0x00][..]].iter() {
            assert!(matches!(
                SignatureData::try_from(*short),
                Err(U2fError::ParseInsufficentBytesAvailable)
            ));
        }
    }

    #[test]
    fn app_id_canonicalisation() {
        let a = AppId::new("http://localhost").unwrap();
        let b = AppId::new("http://localhost/").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_ref(), "http://localhost");

        let c = AppId::new("HTTPS://Site.Example:8443").unwrap();
        assert_eq!(c.as_ref(), "https://site.example:8443");

        // Default ports are elided, so these are the same origin.
        assert_eq!(
            AppId::new("https://site.example:443").unwrap(),
            AppId::new("https://site.example").unwrap()
        );
    }

    #[test]
    fn app_id_rejects_non_origins() {
        for bad in [
            "localhost",
            "site.example/auth",
            "ftp://site.example",
            "wss://site.example",
            "https://site.example/auth",
            "https://site.example?x=1",
            "https://site.example#frag",
            "https://",
            "",
        ]
        .iter()
        {
            assert!(
                matches!(AppId::new(bad), Err(U2fError::InvalidAppId)),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn facet_id_matches_app_id_form() {
        let app = AppId::new("https://site.example").unwrap();
        let facet = FacetId::from(&app);
        assert_eq!(facet, FacetId::new("https://site.example/").unwrap());
        assert!(matches!(
            FacetId::new("not a url"),
            Err(U2fError::InvalidFacetId)
        ));
    }

    #[test]
    fn public_key_structure() {
        let mut point = vec![0x04];
        point.extend(std::iter::repeat(0x11u8).take(64));
        let pk = PublicKey::try_from(point.as_slice()).unwrap();
        assert_eq!(pk.as_bytes(), point.as_slice());
        assert_eq!(pk.x(), &point[1..33]);
        assert_eq!(pk.y(), &point[33..65]);

        // Wrong length and wrong point form.
        assert!(matches!(
            PublicKey::try_from(&point[..64]),
            Err(U2fError::InvalidPublicKey)
        ));
        point[0] = 0x02;
        assert!(matches!(
            PublicKey::try_from(point.as_slice()),
            Err(U2fError::InvalidPublicKey)
        ));
    }

    #[test]
    fn client_data_validation() {
        let good = ClientData {
            typ: "navigator.id.finishEnrollment".to_string(),
            challenge: "cmFuZG9tIGNoYWxsZW5nZQ".to_string(),
            origin: "http://localhost".to_string(),
        };
        assert!(good.validate().is_ok());

        for wipe in ["typ", "challenge", "origin"].iter() {
            let mut bad = good.clone();
            match *wipe {
                "typ" => bad.typ = "".to_string(),
                "challenge" => bad.challenge = "   ".to_string(),
                _ => bad.origin = "\t".to_string(),
            }
            assert!(matches!(
                bad.validate(),
                Err(U2fError::ClientDataFieldMissing)
            ));
        }
    }

    #[test]
    fn client_data_wire_key_is_typ() {
        let parsed = ClientData::from_slice(
            br#"{"typ":"navigator.id.getAssertion","challenge":"vceuzvb378biuniu","origin":"https://localhost:2020"}"#,
        )
        .unwrap();
        assert_eq!(parsed.typ, "navigator.id.getAssertion");
        assert_eq!(parsed.origin, "https://localhost:2020");
    }

    #[test]
    fn deserialise_register_response() {
        let rsp: RegisterResponse = serde_json::from_str(&format!(
            r#"{{"registrationData":"{}","clientData":"e30","version":"U2F_V2"}}"#,
            REGISTRATION_DATA
        ))
        .unwrap();
        assert_eq!(rsp.registration_data.as_ref() as &[u8], registration_blob());
        assert_eq!(rsp.client_data.as_ref() as &[u8], b"{}");
        assert_eq!(rsp.version.as_deref(), Some("U2F_V2"));
    }

    #[test]
    fn device_registration_counter_is_strictly_increasing() {
        let blob = registration_blob();
        let data = RegistrationData::try_from(blob.as_slice()).unwrap();
        let mut reg = DeviceRegistration::new(
            data.key_handle,
            data.public_key,
            data.attestation_cert,
            0,
        );

        assert!(reg.update_counter(1).is_ok());
        assert_eq!(reg.counter(), 1);
        assert!(matches!(
            reg.update_counter(1),
            Err(U2fError::PossibleDeviceCompromise)
        ));
        assert!(matches!(
            reg.update_counter(0),
            Err(U2fError::PossibleDeviceCompromise)
        ));
        // A failed update leaves the counter untouched.
        assert_eq!(reg.counter(), 1);
        assert!(reg.update_counter(u32::MAX).is_ok());
        assert!(matches!(
            reg.update_counter(u32::MAX),
            Err(U2fError::PossibleDeviceCompromise)
        ));
    }

    #[test]
    fn device_registration_json_round_trip() {
        let blob = registration_blob();
        let data = RegistrationData::try_from(blob.as_slice()).unwrap();
        let reg = DeviceRegistration::new(
            data.key_handle,
            data.public_key,
            data.attestation_cert,
            42,
        );

        let json = reg.to_json().unwrap();
        let back = DeviceRegistration::from_json(&json).unwrap();
        assert_eq!(reg, back);
        assert_eq!(back.counter(), 42);

        // The counter is stored as a plain integer, not text.
        assert!(json.contains("\"counter\":42"));
    }
}
