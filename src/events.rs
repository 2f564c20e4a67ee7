use std::sync::mpsc::Sender;

use crate::session::{Guess, Mark, Mode};

/// State-change notifications published by the game controller.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A fresh session replaced the previous one (new game, rollover, mode switch).
    SessionReplaced { mode: Mode, date_string: String },
    WordResolved { mode: Mode },
    GuessScored { guess: Guess, guesses_left: usize },
    GameOver { mode: Mode, won: bool, guess_count: usize },
    ScratchpadChanged { letter: char, mark: Mark },
    StatsUpdated { mode: Mode },
}

pub type Listener = Box<dyn FnMut(&GameEvent)>;

/// Subscribed listeners, called in subscription order.
#[derive(Default)]
pub struct Observers {
    listeners: Vec<Listener>,
}

impl Observers {
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn emit(&mut self, event: GameEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

/// Listener that forwards every event into a channel; a closed channel is ignored.
pub fn forward_to(tx: Sender<GameEvent>) -> impl FnMut(&GameEvent) {
    move |event: &GameEvent| {
        let _ = tx.send(event.clone());
    }
}
