mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use jotto::calendar::{date_string, parse_date, Clock, SystemClock};
use jotto::config::{Config, ConfigStore, FileConfigStore, StoreKind};
use jotto::service::{OfflineService, RateLimited, WordService};
use jotto::stats::StatsTracker;
use jotto::storage::PersistenceGateway;
use jotto::word_source::WordSource;
use jotto::words::WordList;
use jotto::{Game, Mode};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

/// cozy jotto: find the hidden five-letter word from letter overlap counts
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Guess the hidden five-letter word. Each guess is scored with the number of letters it shares with the answer. One shared daily puzzle, plus unlimited zen games."
)]
pub struct Cli {
    /// game mode to start in
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// where saved games and stats are kept
    #[clap(long, value_enum)]
    store: Option<StoreKind>,

    /// directory for saved games and stats
    #[clap(long)]
    state_dir: Option<PathBuf>,

    /// config file to read instead of the platform default
    #[clap(long)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// play interactively, reading guesses from stdin
    Play,
    /// show win rate, streaks and guess distribution
    Stats,
    /// print the shareable result of the current game
    Share,
    /// print the daily word for a date (defaults to today)
    Word {
        #[clap(long)]
        date: Option<String>,
    },
}

impl Cli {
    /// Layer command line flags over the loaded config.
    fn apply(&self, mut config: Config) -> Config {
        if let Some(mode) = self.mode {
            config.default_mode = mode;
        }
        if let Some(store) = self.store {
            config.store = store;
        }
        if let Some(dir) = &self.state_dir {
            config.state_dir = Some(dir.clone());
        }
        config
    }
}

/// One line of player input during `play`.
#[derive(Debug, Clone, PartialEq)]
enum Input<'a> {
    Guess(&'a str),
    Mark(char),
    New,
    Mode(Mode),
    Stats,
    Share,
    Quit,
    Unknown(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let Some(command) = line.strip_prefix(':') else {
        return Input::Guess(line);
    };
    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("mark"), Some(letter), None) => {
            let mut chars = letter.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => Input::Mark(c),
                _ => Input::Unknown(line),
            }
        }
        (Some("mode"), Some(mode), None) => match Mode::from_str(mode, true) {
            Ok(mode) => Input::Mode(mode),
            Err(_) => Input::Unknown(line),
        },
        (Some("new"), None, None) => Input::New,
        (Some("stats"), None, None) => Input::Stats,
        (Some("share"), None, None) => Input::Share,
        (Some("quit" | "q"), None, None) => Input::Quit,
        _ => Input::Unknown(line),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config_store = cli
        .config
        .as_ref()
        .map(FileConfigStore::with_path)
        .unwrap_or_default();
    let config = cli.apply(config_store.load());

    let clock: Rc<dyn Clock> = Rc::new(SystemClock);
    let source = WordSource::new(
        Arc::new(WordList::english()),
        Arc::new(RateLimited::new(OfflineService)),
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command.clone().unwrap_or(Command::Play) {
        Command::Word { date } => {
            let date = match date {
                Some(raw) => parse_date(&raw)
                    .with_context(|| format!("invalid date {raw:?}, expected YYYY-MM-DD"))?,
                None => clock.today(),
            };
            writeln!(out, "{}", source.resolve_daily(&date_string(date)))?;
        }
        Command::Stats => {
            let tracker = StatsTracker::load(open_store(&config)?, clock);
            ui::render_stats(tracker.stats(), &mut out)?;
        }
        Command::Share => {
            let game = Game::new(config.default_mode, source, open_store(&config)?, clock);
            if !game.session().is_over() {
                writeln!(out, "Nothing to share yet.")?;
            } else {
                writeln!(out, "{}", game.share_text())?;
            }
        }
        Command::Play => {
            let mut game = Game::new(config.default_mode, source, open_store(&config)?, clock);
            let stdin = io::stdin();
            play(&mut game, stdin.lock(), &mut out).await?;
        }
    }

    Ok(())
}

fn open_store(config: &Config) -> Result<Rc<dyn PersistenceGateway>> {
    let state_dir = config.resolved_state_dir();
    config
        .store
        .open(&state_dir)
        .with_context(|| format!("opening {} store in {}", config.store, state_dir.display()))
}

async fn play<W, R, O>(game: &mut Game<W>, input: R, out: &mut O) -> Result<()>
where
    W: WordService,
    R: BufRead,
    O: Write,
{
    game.activate();
    game.ensure_zen_word().await;
    ui::render_board(game, out)?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_input(line) {
            Input::Quit => break,
            Input::Guess(word) => {
                // the day may have turned over while the prompt sat idle
                if game.activate() {
                    writeln!(out, "A new daily puzzle is ready.")?;
                }
                match game.submit_guess_checked(word).await {
                    Ok(outcome) => ui::render_guess(game, &outcome, out)?,
                    Err(e) => writeln!(out, "{e}")?,
                }
            }
            Input::Mark(letter) => {
                game.cycle_scratchpad(letter);
                let pad = ui::render_scratchpad(
                    game.session().scratchpad().iter().map(|(c, m)| (*c, *m)),
                );
                writeln!(out, "notes: {pad}")?;
            }
            Input::New => {
                if game.play_again() {
                    game.ensure_zen_word().await;
                    ui::render_board(game, out)?;
                } else {
                    writeln!(out, "The daily puzzle can't be replayed. Try :mode zen")?;
                }
            }
            Input::Mode(mode) => {
                game.switch_mode(mode);
                game.activate();
                game.ensure_zen_word().await;
                ui::render_board(game, out)?;
            }
            Input::Stats => ui::render_stats(game.stats().stats(), out)?,
            Input::Share if game.session().is_over() => writeln!(out, "{}", game.share_text())?,
            Input::Share => writeln!(out, "Finish the game to share your result.")?,
            Input::Unknown(cmd) => writeln!(
                out,
                "Unknown command {cmd}. Try :mark X, :new, :mode daily|zen, :stats, :share or :quit"
            )?,
        }
        out.flush()?;
    }

    Ok(())
}
