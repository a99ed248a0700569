//! Transport-safe encoding of store-issued confirmation and reset tokens.

use base64::Engine;
use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

/// URL-safe base64 that emits no padding and accepts it either way.
const LINK_SAFE: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes a raw token for use in a link.
pub fn encode_token(raw: &str) -> String {
    LINK_SAFE.encode(raw.as_bytes())
}

/// Decodes a link token. `None` when it is not valid base64url or UTF-8.
pub fn decode_token(encoded: &str) -> Option<String> {
    let bytes = LINK_SAFE.decode(encoded.trim()).ok()?;
    String::from_utf8(bytes).ok()
}
