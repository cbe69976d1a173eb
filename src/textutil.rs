use encoding_rs::UTF_16LE;

/// Decode UTF-16 LE bytes without BOM stripping, so a leading BOM (present in
/// the game's asset files) survives as U+FEFF and round-trips byte-identical.
pub fn decode_utf16le(bytes: &[u8]) -> String {
    let (text, _had_errors) = UTF_16LE.decode_without_bom_handling(bytes);
    text.into_owned()
}

// encoding_rs only decodes UTF-16; encoding goes through std.
pub fn encode_utf16le(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

/// Split into lines keeping each line's terminator, so untouched lines can be
/// written back verbatim. A final line without a terminator is kept as-is.
pub fn split_lines_keep_ends(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0usize;
    for (i, ch) in text.char_indices() {
        if ch == '\n' {
            lines.push(&text[start..=i]);
            start = i + 1;
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf16le_round_trip() {
        let text = "\u{feff}苹果\tctx1\tctx2\tApple\r\n";
        let bytes = encode_utf16le(text);
        assert_eq!(decode_utf16le(&bytes), text);
    }

    #[test]
    fn split_keeps_terminators() {
        let lines = split_lines_keep_ends("a\tb\r\nc\nd");
        assert_eq!(lines, vec!["a\tb\r\n", "c\n", "d"]);
    }

    #[test]
    fn split_empty_text() {
        assert!(split_lines_keep_ends("").is_empty());
    }
}
