//! Byte-level alphabet for GPT-2 style BPE.
//!
//! Every raw byte is mapped to a printable Unicode character so that merges and
//! vocabulary entries can be written as ordinary strings:
//!
//! - Bytes 33-126, 161-172 and 174-255 map to the character with the same code point
//! - The remaining 68 bytes (controls, space, NBSP, soft hyphen) map to U+0100 onwards,
//!   in byte order
//!
//! Space (0x20) therefore becomes `Ġ` (U+0120) and newline becomes `Ċ` (U+010A).

use crate::core::vocab::Vocabulary;

/// Byte to placeholder character mapping, computed at compile time.
pub static BYTE_TO_CHAR: [char; 256] = build_byte_to_char();

const fn is_printable(byte: usize) -> bool {
    (byte >= 33 && byte <= 126) || (byte >= 161 && byte <= 172) || (byte >= 174 && byte <= 255)
}

const fn build_byte_to_char() -> [char; 256] {
    let mut table = ['\0'; 256];
    let mut next = 256u32;
    let mut byte = 0usize;

    while byte < 256 {
        let code = if is_printable(byte) {
            byte as u32
        } else {
            next += 1;
            next - 1
        };
        table[byte] = match char::from_u32(code) {
            Some(ch) => ch,
            None => '\0',
        };
        byte += 1;
    }

    table
}

/// Get the placeholder character for a byte.
#[inline]
pub fn byte_char(byte: u8) -> char {
    BYTE_TO_CHAR[byte as usize]
}

/// Encode raw bytes into their placeholder string.
pub fn encode_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| byte_char(b)).collect()
}

/// Raw byte -> vocabulary id of the byte's placeholder character.
///
/// Bytes whose placeholder is missing from the vocabulary map to the unknown token.
#[derive(Debug, Clone)]
pub struct ByteEncoder {
    ids: [u32; 256],
}

impl ByteEncoder {
    /// Build the table from a vocabulary.
    pub fn from_vocab(vocab: &Vocabulary, unk_id: u32) -> Self {
        let mut ids = [unk_id; 256];
        let mut buf = [0u8; 4];

        for (byte, id) in ids.iter_mut().enumerate() {
            let ch: &str = BYTE_TO_CHAR[byte].encode_utf8(&mut buf);
            if let Some(found) = vocab.get_id(ch) {
                *id = found;
            }
        }

        Self { ids }
    }

    /// Get the id for a raw byte.
    #[inline]
    pub fn id(&self, byte: u8) -> u32 {
        self.ids[byte as usize]
    }

    /// The full 256-entry table.
    pub fn as_array(&self) -> &[u32; 256] {
        &self.ids
    }

    /// Number of bytes that fell back to the unknown token.
    pub fn unmapped(&self, unk_id: u32) -> usize {
        self.ids.iter().filter(|&&id| id == unk_id).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_mapping_is_bijective() {
        let seen: HashSet<char> = BYTE_TO_CHAR.iter().copied().collect();
        assert_eq!(seen.len(), 256);
        assert!(!seen.contains(&'\0'));
    }

    #[test]
    fn test_known_placeholders() {
        assert_eq!(byte_char(b' '), 'Ġ');
        assert_eq!(byte_char(b'\n'), 'Ċ');
        assert_eq!(byte_char(0), '\u{100}');
        assert_eq!(byte_char(0xAD), '\u{143}');
        for b in 33u8..=126 {
            assert_eq!(byte_char(b) as u32, b as u32);
        }
    }

    #[test]
    fn test_encode_bytes() {
        assert_eq!(encode_bytes(b" hello"), "Ġhello");
        assert_eq!(encode_bytes("é".as_bytes()), "Ã©");
    }

    #[test]
    fn test_byte_encoder_falls_back_to_unk() {
        let vocab = Vocabulary::from_json(r#"{"<unk>": 0, "a": 5, "Ġ": 9}"#).unwrap();
        let encoder = ByteEncoder::from_vocab(&vocab, 0);

        assert_eq!(encoder.id(b'a'), 5);
        assert_eq!(encoder.id(b' '), 9);
        assert_eq!(encoder.id(b'b'), 0);
        assert_eq!(encoder.unmapped(0), 254);
    }
}
