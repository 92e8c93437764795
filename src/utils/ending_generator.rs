//! Candidate link ending generation.
//!
//! Candidates are drawn as random integers over the [`symbol_codec`] alphabet
//! and then rewritten until they are comfortable to read: no symbol three
//! times in a row, no more than three letters in a row, at least one letter,
//! and none of the configured forbidden substrings.
//!
//! Generation is a pure function over randomness. Uniqueness against stored
//! endings is checked by [`crate::application::services::EndingPoolService`].

use rand::Rng;
use std::collections::HashSet;

use crate::utils::symbol_codec::{self, ALPHABET, BASE, ZERO_SYMBOL, is_letter};

/// Digits of the alphabet; substituted digits are drawn from here so that
/// candidates never leave the alphabet.
const DIGITS: &[char] = &['2', '3', '4', '6', '7', '8', '9'];

/// Letters spliced into an all-digit candidate.
const SPLICE_LETTERS: &[char] = &['A', 'B', 'C', 'D'];

/// Most symbols one `u64` draw can cover (`32^12 = 2^60`).
const MAX_SYMBOLS_PER_DRAW: usize = 12;

/// Longest permitted run of one repeated symbol.
const MAX_SYMBOL_RUN: usize = 2;

/// Longest permitted run of consecutive letters.
const MAX_LETTER_RUN: usize = 3;

/// Attempt budget per requested candidate in [`EndingGenerator::generate_batch`].
const ATTEMPTS_PER_CANDIDATE: usize = 64;

/// Substrings kept out of generated endings unless configured otherwise.
pub const DEFAULT_FORBIDDEN_SUBSTRINGS: &[&str] = &[
    "ASS", "CUM", "DIK", "FUC", "FUK", "FAG", "KKK", "NAZ", "POO", "SEX", "TIT", "WTF",
];

/// Generates syntactically valid candidate endings of a fixed length.
#[derive(Debug, Clone)]
pub struct EndingGenerator {
    length: usize,
    forbidden_substrings: Vec<String>,
}

impl EndingGenerator {
    /// Creates a generator for endings of `length` symbols.
    ///
    /// Forbidden substrings are matched case-insensitively; empty entries are
    /// ignored.
    pub fn new<I, S>(length: usize, forbidden_substrings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let forbidden_substrings = forbidden_substrings
            .into_iter()
            .map(|s| s.as_ref().trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            length,
            forbidden_substrings,
        }
    }

    /// Length of the endings this generator produces.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Configured forbidden substrings, upper-cased.
    pub fn forbidden_substrings(&self) -> &[String] {
        &self.forbidden_substrings
    }

    /// Returns true if `ending` satisfies every rule a generated ending must meet.
    pub fn is_valid(&self, ending: &str) -> bool {
        ending.chars().count() == self.length
            && is_valid_ending(ending, &self.forbidden_substrings)
    }

    /// Produces up to `count` distinct valid candidates using the thread RNG.
    pub fn candidates(&self, count: usize) -> Vec<String> {
        self.generate_batch(&mut rand::rng(), count)
    }

    /// Produces up to `count` distinct valid candidates.
    ///
    /// Makes at most `64 * count` attempts. A result shorter than `count` is
    /// not an error: very short lengths or restrictive forbidden lists can
    /// exhaust the attempt budget.
    pub fn generate_batch<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<String> {
        let mut seen = HashSet::with_capacity(count);
        let mut endings = Vec::with_capacity(count);

        if self.length == 0 {
            return endings;
        }

        let max_attempts = count.saturating_mul(ATTEMPTS_PER_CANDIDATE);
        let mut attempts = 0;

        while endings.len() < count && attempts < max_attempts {
            attempts += 1;

            let ending = self.generate_one(rng);
            if !self.is_valid(&ending) {
                continue;
            }
            if seen.insert(ending.clone()) {
                endings.push(ending);
            }
        }

        endings
    }

    /// Produces a single candidate.
    ///
    /// The forbidden-substring pass runs once and is not re-scanned, so the
    /// result is not guaranteed valid; [`Self::generate_batch`] filters it.
    pub fn generate_one<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let raw = self.draw_raw(rng);
        let mut ending = enforce_runs(rng, &raw);

        if !ending.iter().any(|c| is_letter(*c)) && !ending.is_empty() {
            let position = rng.random_range(0..ending.len());
            ending[position] = SPLICE_LETTERS[rng.random_range(0..SPLICE_LETTERS.len())];
        }

        for forbidden in &self.forbidden_substrings {
            let text: String = ending.iter().collect();
            if let Some(byte_index) = text.find(forbidden.as_str()) {
                // Every symbol is ASCII, so byte and char indices agree.
                let before = byte_index.checked_sub(1).map(|i| ending[i]);
                let after = ending.get(byte_index + 1).copied();
                let current = ending[byte_index];
                ending[byte_index] = random_digit_avoiding(rng, &[before, after, Some(current)]);
            }
        }

        ending.into_iter().collect()
    }

    /// Draws `length` symbols, padding each draw with the zero symbol.
    fn draw_raw<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<char> {
        let mut raw = Vec::with_capacity(self.length);

        while raw.len() < self.length {
            let symbols = (self.length - raw.len()).min(MAX_SYMBOLS_PER_DRAW);
            let value = rng.random_range(0..BASE.pow(symbols as u32));

            let mut chunk: Vec<char> = symbol_codec::encode(value).chars().collect();
            chunk.resize(symbols, ZERO_SYMBOL);
            raw.extend(chunk);
        }

        raw
    }
}

/// Rewrites `raw` left to right so no symbol repeats three times in a row and
/// no more than three letters appear in a row.
fn enforce_runs<R: Rng + ?Sized>(rng: &mut R, raw: &[char]) -> Vec<char> {
    let mut ending: Vec<char> = Vec::with_capacity(raw.len());
    let mut symbol_run = 0;
    let mut letter_run = 0;

    for &original in raw {
        let previous = ending.last().copied();
        let mut symbol = original;

        if Some(symbol) == previous && symbol_run >= MAX_SYMBOL_RUN {
            let drawn = ALPHABET[rng.random_range(0..ALPHABET.len())] as char;
            symbol = if drawn != symbol {
                drawn
            } else if symbol == 'A' {
                'B'
            } else {
                'A'
            };
        }

        if is_letter(symbol) && letter_run >= MAX_LETTER_RUN {
            symbol = random_digit_avoiding(rng, &[previous]);
        }

        symbol_run = if Some(symbol) == previous {
            symbol_run + 1
        } else {
            1
        };
        letter_run = if is_letter(symbol) { letter_run + 1 } else { 0 };

        ending.push(symbol);
    }

    ending
}

fn random_digit_avoiding<R: Rng + ?Sized>(rng: &mut R, avoid: &[Option<char>]) -> char {
    let allowed: Vec<char> = DIGITS
        .iter()
        .copied()
        .filter(|d| !avoid.contains(&Some(*d)))
        .collect();

    if allowed.is_empty() {
        DIGITS[rng.random_range(0..DIGITS.len())]
    } else {
        allowed[rng.random_range(0..allowed.len())]
    }
}

/// Checks the readability rules every generated ending must satisfy.
///
/// `forbidden_substrings` must already be upper-cased.
pub fn is_valid_ending(ending: &str, forbidden_substrings: &[String]) -> bool {
    if ending.is_empty() || !ending.chars().all(symbol_codec::is_canonical_symbol) {
        return false;
    }

    if !ending.chars().any(is_letter) {
        return false;
    }

    let mut previous = None;
    let mut symbol_run = 0;
    let mut letter_run = 0;

    for symbol in ending.chars() {
        symbol_run = if Some(symbol) == previous {
            symbol_run + 1
        } else {
            1
        };
        letter_run = if is_letter(symbol) { letter_run + 1 } else { 0 };

        if symbol_run > MAX_SYMBOL_RUN || letter_run > MAX_LETTER_RUN {
            return false;
        }

        previous = Some(symbol);
    }

    !forbidden_substrings
        .iter()
        .any(|forbidden| ending.contains(forbidden.as_str()))
}
