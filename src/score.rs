//! Letter-overlap scoring.
//!
//! A guess scores the number of distinct letters it shares with the target,
//! independent of position and of how often a letter repeats. Winning is a
//! separate exact-equality check: an anagram of the target scores 5 without
//! being a win.

/// Bitmask of the distinct ASCII letters in `word`, bit 0 = 'A'.
fn letter_set(word: &str) -> u32 {
    word.chars()
        .filter_map(|c| {
            let c = c.to_ascii_uppercase();
            c.is_ascii_uppercase().then(|| 1u32 << (c as u8 - b'A'))
        })
        .fold(0, |set, bit| set | bit)
}

/// Number of distinct letters shared by `guess` and `target`.
pub fn score(guess: &str, target: &str) -> u8 {
    (letter_set(guess) & letter_set(target)).count_ones() as u8
}

/// Case-insensitive exact match; the only way to win.
pub fn is_exact_match(guess: &str, target: &str) -> bool {
    guess.eq_ignore_ascii_case(target)
}

pub fn distinct_letters(word: &str) -> usize {
    letter_set(word).count_ones() as usize
}
