use itertools::Itertools;

use crate::calendar::format_for_display;
use crate::session::{Guess, Mode, MAX_GUESSES};
use crate::words::WORD_LENGTH;

pub const GAME_TITLE: &str = "Cozy Jotto";
pub const FILLED: &str = "🟢";
pub const EMPTY: &str = "⚪";

/// Shareable result block. Pure: identical inputs give identical text.
///
/// ```text
/// Cozy Jotto Jan 1, 2024
/// Solved in 4/10 ☕
///
/// 🟢🟢⚪⚪⚪
/// ...
/// ```
pub fn share_text(guesses: &[Guess], is_won: bool, date_string: &str, mode: Mode) -> String {
    let header = match mode {
        Mode::Daily => format_for_display(date_string),
        Mode::Zen => "Zen Mode".to_string(),
    };

    let result = if is_won {
        guesses.len().to_string()
    } else {
        "X".to_string()
    };

    let grid = guesses.iter().map(marker_row).join("\n");

    [
        format!("{GAME_TITLE} {header}"),
        format!(
            "{} in {result}/{MAX_GUESSES} ☕",
            if is_won { "Solved" } else { "Failed" }
        ),
        String::new(),
        grid,
    ]
    .join("\n")
}

fn marker_row(guess: &Guess) -> String {
    let filled = usize::from(guess.matches()).min(WORD_LENGTH);
    FILLED.repeat(filled) + &EMPTY.repeat(WORD_LENGTH - filled)
}
