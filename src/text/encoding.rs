// Text decoding for source files of unknown encoding.

/// Decode bytes as UTF-8 (dropping a leading BOM), falling back to Latin-1
/// when the bytes are not valid UTF-8. Latin-1 maps every byte to the code
/// point of the same value, so the fallback never fails.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => decode_latin1(bytes),
    }
}

pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Normalise line endings to `\n`.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_with_bom() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFcaf\xC3\xA9"), "café");
    }

    #[test]
    fn test_latin1_fallback() {
        assert_eq!(decode_text(b"caf\xE9"), "café");
    }

    #[test]
    fn test_newlines() {
        assert_eq!(normalize_newlines("a\r\nb\rc"), "a\nb\nc");
    }
}
