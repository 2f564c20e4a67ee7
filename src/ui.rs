use std::io::{self, Write};

use jotto::calendar::format_for_display;
use jotto::service::WordService;
use jotto::session::{Mark, MAX_GUESSES};
use jotto::stats::{Stats, StatsRecord};
use jotto::{Game, GuessOutcome, Mode, Phase};

const HISTOGRAM_WIDTH: u32 = 20;

pub fn render_board<W: WordService, O: Write>(game: &Game<W>, out: &mut O) -> io::Result<()> {
    let session = game.session();
    match session.mode() {
        Mode::Daily => writeln!(
            out,
            "Cozy Jotto (daily, {})",
            format_for_display(session.date_string())
        )?,
        Mode::Zen => writeln!(out, "Cozy Jotto (zen)")?,
    }

    for (i, guess) in session.guesses().iter().enumerate() {
        writeln!(out, "{:>3}. {} {}", i + 1, guess.word(), guess.matches())?;
    }

    let pad = render_scratchpad(session.scratchpad().iter().map(|(c, m)| (*c, *m)));
    if !pad.is_empty() {
        writeln!(out, "notes: {pad}")?;
    }

    match game.phase() {
        Phase::Uninitialized | Phase::AwaitingWord => {
            writeln!(out, "Fetching a word...")?;
        }
        Phase::InProgress => {
            writeln!(out, "{}/{MAX_GUESSES} guesses left", session.guesses_left())?;
        }
        Phase::Over(_) => {
            if game.has_played_today() {
                writeln!(
                    out,
                    "You've already played today's puzzle. Come back tomorrow!"
                )?;
            } else {
                writeln!(out, "Game over. Type :new for another round.")?;
            }
        }
    }
    Ok(())
}

/// `A+ E? Q-` style summary of non-neutral scratchpad marks.
pub fn render_scratchpad(marks: impl Iterator<Item = (char, Mark)>) -> String {
    marks
        .filter_map(|(letter, mark)| {
            let symbol = match mark {
                Mark::Neutral => return None,
                Mark::Present => '+',
                Mark::AbsentGuess => '?',
                Mark::Excluded => '-',
            };
            Some(format!("{letter}{symbol}"))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_guess<W: WordService, O: Write>(
    game: &Game<W>,
    outcome: &GuessOutcome,
    out: &mut O,
) -> io::Result<()> {
    writeln!(out, "{} {}", outcome.guess.word(), outcome.guess.matches())?;
    if outcome.is_won {
        let count = game.session().guesses().len();
        writeln!(
            out,
            "You got it in {count}! ☕ {}% of {} games won.",
            game.win_percentage(game.mode()),
            game.mode()
        )?;
    } else if outcome.is_over {
        writeln!(
            out,
            "Out of guesses. The word was {}.",
            game.session().target_word().unwrap_or("?????")
        )?;
    }
    Ok(())
}

pub fn render_stats<O: Write>(stats: &Stats, out: &mut O) -> io::Result<()> {
    for mode in [Mode::Daily, Mode::Zen] {
        render_record(mode, stats.record(mode), out)?;
    }
    Ok(())
}

fn render_record<O: Write>(mode: Mode, record: &StatsRecord, out: &mut O) -> io::Result<()> {
    write!(
        out,
        "{mode}: played {}, won {} ({}%)",
        record.games_played,
        record.games_won,
        record.win_percentage()
    )?;
    if mode == Mode::Daily {
        write!(
            out,
            ", streak {}, best {}",
            record.current_streak, record.max_streak
        )?;
    }
    if record.games_won > 0 {
        write!(out, ", average {:.1}", record.average_guesses)?;
    }
    writeln!(out)?;

    let most = record.guess_distribution.values().copied().max().unwrap_or(0);
    if most == 0 {
        return Ok(());
    }
    for (guesses, wins) in &record.guess_distribution {
        let width = (wins * HISTOGRAM_WIDTH).div_ceil(most);
        writeln!(
            out,
            "{guesses:>4} | {} {wins}",
            "#".repeat(width as usize)
        )?;
    }
    Ok(())
}
