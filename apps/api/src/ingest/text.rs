//! Plain-text decoding with a legacy-encoding fallback.
//!
//! Plain-text resumes from some locales are not UTF-8; naive lossy decoding
//! silently corrupts glyphs. Strict UTF-8 is tried first and any decode error
//! falls through to GBK.

/// Decodes raw text bytes: strict UTF-8, then GBK.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            tracing::debug!("input is not valid UTF-8, decoding as GBK");
            let (decoded, _, _) = encoding_rs::GBK.decode(bytes);
            decoded.into_owned()
        }
    }
}
