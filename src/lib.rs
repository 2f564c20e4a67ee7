// Library surface shared by the binary and the integration tests.
pub mod app_dirs;
pub mod calendar;
pub mod config;
pub mod events;
pub mod game;
pub mod record;
pub mod score;
pub mod service;
pub mod session;
pub mod share;
pub mod stats;
pub mod storage;
pub mod util;
pub mod validate;
pub mod word_source;
pub mod words;

pub use game::{Game, GuessOutcome};
pub use session::{GameSession, Guess, Mode, Phase, SubmitError};
pub use validate::GuessError;
