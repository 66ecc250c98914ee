//! Self-contained image payloads
//!
//! Cached records embed their image as a `data:` URL so a session can
//! be restored without re-fetching anything from the backend.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// MIME type guessed from a filename extension. Unknown extensions fall
/// back to JPEG, matching the upload endpoint's default.
fn mime_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "image/jpeg",
    }
}

/// Encode raw image bytes as a `data:` URL.
pub fn to_data_url(filename: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_for(filename),
        STANDARD.encode(bytes)
    )
}

/// The base64 payload of a `data:` URL, without the header.
pub fn base64_payload(data_url: &str) -> Option<&str> {
    data_url
        .strip_prefix("data:")?
        .split_once("base64,")
        .map(|(_, payload)| payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_for("cat.PNG"), "image/png");
        assert_eq!(mime_for("dog.jpeg"), "image/jpeg");
        assert_eq!(mime_for("noext"), "image/jpeg");
    }

    #[test]
    fn test_data_url_round_trip() {
        let url = to_data_url("cat.png", b"hello");
        assert!(url.starts_with("data:image/png;base64,"));

        let payload = base64_payload(&url).unwrap();
        assert_eq!(STANDARD.decode(payload).unwrap(), b"hello");
    }

    #[test]
    fn test_payload_of_non_data_url() {
        assert!(base64_payload("https://example.com/cat.png").is_none());
    }
}
