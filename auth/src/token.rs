use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

/// Number of random bytes in an opaque token (256 bits of entropy).
const TOKEN_BYTES: usize = 32;

/// Generate an unguessable opaque token string.
///
/// 32 bytes from the OS CSPRNG, base64url-encoded without padding. Used for
/// server-stored credentials (confirmation and refresh tokens) where the
/// string itself is the lookup key.
pub fn generate_opaque_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
