//! Byte <-> char tables for byte-level BPE.
//!
//! Both directions are built at compile time. The forward table holds one
//! char per byte value. The inverse only stores the 68 bytes whose chars were
//! moved to U+0100..U+0143; every other char is its own byte, so
//! [`char_to_byte`] checks the identity ranges first and falls back to an
//! index into that short array.

/// Number of bytes that are not printable and get shifted above U+00FF.
const SHIFTED_COUNT: usize = 68;
const SHIFT_BASE: u32 = 0x100;

static TABLES: ([char; 256], [u8; SHIFTED_COUNT]) = build_tables();

const fn maps_to_itself(b: u8) -> bool {
    matches!(b, 0x21..=0x7E | 0xA1..=0xAC | 0xAE..=0xFF)
}

const fn build_tables() -> ([char; 256], [u8; SHIFTED_COUNT]) {
    let mut to_char = ['\0'; 256];
    let mut shifted = [0u8; SHIFTED_COUNT];
    let mut n = 0usize;
    let mut b = 0usize;
    while b < 256 {
        if maps_to_itself(b as u8) {
            to_char[b] = b as u8 as char;
        } else {
            to_char[b] = match char::from_u32(SHIFT_BASE + n as u32) {
                Some(c) => c,
                None => '\0',
            };
            shifted[n] = b as u8;
            n += 1;
        }
        b += 1;
    }
    (to_char, shifted)
}

/// The full byte → char table.
pub fn byte_to_char_table() -> &'static [char; 256] {
    &TABLES.0
}

#[inline]
pub fn byte_to_char(b: u8) -> char {
    TABLES.0[b as usize]
}

/// Inverse of [`byte_to_char`]. Characters outside the table have no byte.
#[inline]
pub fn char_to_byte(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if cp <= 0xFF && maps_to_itself(cp as u8) {
        return Some(cp as u8);
    }
    match cp.checked_sub(SHIFT_BASE) {
        Some(i) if (i as usize) < SHIFTED_COUNT => Some(TABLES.1[i as usize]),
        _ => None,
    }
}

/// Encode raw bytes into the GPT-2 unicode representation.
pub fn encode_bytes(input: &[u8]) -> String {
    let mut out = String::with_capacity(input.len() * 2);
    for &b in input {
        out.push(byte_to_char(b));
    }
    out
}

/// Map a byte-level string back to raw bytes, dropping characters that have
/// no byte.
pub fn decode_chars(text: &str) -> Vec<u8> {
    text.chars().filter_map(char_to_byte).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_byte_round_trips() {
        for b in 0..=255u8 {
            assert_eq!(char_to_byte(byte_to_char(b)), Some(b), "byte {b:#04x}");
        }
    }

    #[test]
    fn table_is_a_bijection() {
        let mut seen = std::collections::HashSet::new();
        for &c in byte_to_char_table() {
            assert!(seen.insert(c), "duplicate char {c:?}");
        }
        assert_eq!(seen.len(), 256);
    }

    #[test]
    fn printable_bytes_map_to_themselves() {
        assert_eq!(byte_to_char(b'!'), '!');
        assert_eq!(byte_to_char(b'~'), '~');
        assert_eq!(byte_to_char(0xA1), '\u{A1}');
        assert_eq!(byte_to_char(0xFF), '\u{FF}');
    }

    #[test]
    fn shifted_bytes_follow_byte_order() {
        assert_eq!(byte_to_char(0x00), '\u{100}');
        assert_eq!(byte_to_char(b' '), '\u{120}'); // Ġ
        assert_eq!(byte_to_char(b'\n'), '\u{10A}'); // Ċ
        assert_eq!(byte_to_char(0x7F), '\u{121}');
        assert_eq!(byte_to_char(0xAD), '\u{143}');
    }

    #[test]
    fn inverse_covers_every_shifted_char() {
        for cp in 0x100..0x144u32 {
            let c = char::from_u32(cp).unwrap();
            let b = char_to_byte(c).unwrap_or_else(|| panic!("no byte for U+{cp:04X}"));
            assert!(!maps_to_itself(b));
            assert_eq!(byte_to_char(b), c);
        }
    }

    #[test]
    fn chars_outside_the_table_have_no_byte() {
        assert_eq!(char_to_byte(' '), None);
        assert_eq!(char_to_byte('\u{144}'), None);
        assert_eq!(char_to_byte('\u{AD}'), None);
        assert_eq!(char_to_byte('€'), None);
    }

    #[test]
    fn encode_then_decode_utf8_text() {
        let text = "héllo wörld 🦀\n";
        let encoded = encode_bytes(text.as_bytes());
        assert!(!encoded.contains(' '));
        assert_eq!(decode_chars(&encoded), text.as_bytes());
    }

    #[test]
    fn decode_drops_unmapped_chars() {
        assert_eq!(decode_chars("a b"), b"ab");
    }
}
