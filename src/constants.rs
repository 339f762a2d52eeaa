//! Protocol constants. These come from the FIDO U2F raw message format
//! and javascript API specifications and will not change for U2F_V2.

/// The number of random bytes in a generated challenge.
// Can this ever change?
pub const CHALLENGE_SIZE_BYTES: usize = 32;

/// The protocol version string carried in every request message.
pub const U2F_VERSION: &str = "U2F_V2";

/// The client data type value of a registration ceremony.
pub const REGISTER_TYPE: &str = "navigator.id.finishEnrollment";

/// The client data type value of an authentication ceremony.
pub const SIGN_TYPE: &str = "navigator.id.getAssertion";

// Registration responses open with this reserved byte.
pub(crate) const REGISTRATION_RESERVED_BYTE: u8 = 0x05;

// An uncompressed EC point: 0x04 prefix, 32 byte X, 32 byte Y.
pub(crate) const PUBLIC_KEY_LEN: usize = 65;
pub(crate) const UNCOMPRESSED_POINT_PREFIX: u8 = 0x04;

// The only defined bit of the user presence byte.
pub(crate) const USER_PRESENT_FLAG: u8 = 0b0000_0001;
