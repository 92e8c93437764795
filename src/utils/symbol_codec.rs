//! Base-32 symbol codec for link endings.
//!
//! The alphabet leaves out symbols that are easily confused when read aloud or
//! typed by hand (`0`, `1`, `5`, `Q`). Decoding is tolerant of those symbols:
//! each one decodes to the value of the canonical symbol it resembles.

/// Ordered alphabet; the index of a symbol is its digit value.
pub const ALPHABET: &[u8; 32] = b"2346789ABCDEFGHIJKLMNOPRSTUVWXYZ";

/// Number of symbols in [`ALPHABET`].
pub const BASE: u64 = ALPHABET.len() as u64;

/// Symbol with digit value zero, used for padding.
pub const ZERO_SYMBOL: char = ALPHABET[0] as char;

/// Confusable input symbols and the canonical symbol each stands for.
const CONFUSABLES: &[(u8, u8)] = &[(b'1', b'I'), (b'0', b'O'), (b'Q', b'O'), (b'5', b'S')];

/// Decoding table indexed by ASCII byte; `None` marks bytes outside the table.
static DECODE_TABLE: [Option<u8>; 128] = build_decode_table();

const fn build_decode_table() -> [Option<u8>; 128] {
    let mut table = [None; 128];

    let mut i = 0;
    while i < ALPHABET.len() {
        let symbol = ALPHABET[i];
        table[symbol as usize] = Some(i as u8);
        table[symbol.to_ascii_lowercase() as usize] = Some(i as u8);
        i += 1;
    }

    let mut j = 0;
    while j < CONFUSABLES.len() {
        let (similar, canonical) = CONFUSABLES[j];
        let value = table[canonical as usize];
        table[similar as usize] = value;
        table[similar.to_ascii_lowercase() as usize] = value;
        j += 1;
    }

    table
}

/// Returns the digit value of a symbol, honoring case and confusables.
pub fn symbol_value(symbol: char) -> Option<u8> {
    if symbol.is_ascii() {
        DECODE_TABLE[symbol as usize]
    } else {
        None
    }
}

/// Returns true if `symbol` belongs to the canonical alphabet (upper case).
pub fn is_canonical_symbol(symbol: char) -> bool {
    symbol.is_ascii() && ALPHABET.contains(&(symbol as u8))
}

/// Returns true for the letters of the alphabet.
pub fn is_letter(symbol: char) -> bool {
    symbol.is_ascii_uppercase()
}

/// Encodes `value` least-significant digit first.
///
/// Zero encodes to the empty string; callers pad to the length they need.
pub fn encode(mut value: u64) -> String {
    let mut encoded = String::new();

    while value > 0 {
        encoded.push(ALPHABET[(value % BASE) as usize] as char);
        value /= BASE;
    }

    encoded
}

/// Decodes a string produced by [`encode`], least-significant digit first.
///
/// Case-insensitive. Confusable symbols decode to their canonical value and
/// symbols outside the table contribute zero. Overlong input wraps instead of
/// failing, so the result is only meaningful for strings of at most 12 symbols.
pub fn decode(encoded: &str) -> u64 {
    let mut value: u64 = 0;
    let mut radix: u64 = 1;

    for symbol in encoded.chars() {
        let digit = symbol_value(symbol).unwrap_or(0) as u64;
        value = value.wrapping_add(digit.wrapping_mul(radix));
        radix = radix.wrapping_mul(BASE);
    }

    value
}

/// Replaces confusable symbols with their canonical counterparts, upper-cases
/// the result and drops hyphens.
///
/// Used as a second-chance lookup key when an exact ending match fails.
pub fn normalize_confusables(input: &str) -> String {
    input
        .chars()
        .filter(|c| *c != '-')
        .map(|c| {
            let upper = c.to_ascii_uppercase();
            CONFUSABLES
                .iter()
                .find(|(similar, _)| *similar as char == upper)
                .map(|(_, canonical)| *canonical as char)
                .unwrap_or(upper)
        })
        .collect()
}
