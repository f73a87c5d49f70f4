//! Byte decoding helpers.

use std::borrow::Cow;

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding (from `<meta charset>` or an XML declaration)
/// 3. Falls back to Windows-1252 (common in legacy pages)
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    // Try UTF-8 first (handles BOM automatically)
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Sniff a declared character encoding from the start of a document.
///
/// Looks at the first 1024 bytes for `<meta charset=...>`,
/// `<meta ... content="...; charset=...">` or `<?xml ... encoding="..."?>`.
pub fn extract_charset(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(1024)];

    find_attr_value(prefix, b"charset=").or_else(|| {
        let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
        find_attr_value(&prefix[xml_start..], b"encoding=")
    })
}

/// Find `key` (case-insensitive) and return the value after it, quoted or bare.
fn find_attr_value<'a>(haystack: &'a [u8], key: &[u8]) -> Option<&'a str> {
    let pos = haystack
        .windows(key.len())
        .position(|w| w.eq_ignore_ascii_case(key))?;
    let rest = &haystack[pos + key.len()..];
    let (rest, terminators): (&[u8], &[u8]) = match rest.first()? {
        b'"' => (&rest[1..], b"\""),
        b'\'' => (&rest[1..], b"'"),
        _ => (rest, b" \t\r\n;\"'/>"),
    };
    let end = rest
        .iter()
        .position(|b| terminators.contains(b))
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    std::str::from_utf8(&rest[..end]).ok()
}
