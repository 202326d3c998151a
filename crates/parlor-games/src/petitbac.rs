//! Petit Bac: find a word per category starting with the round's letter.
//!
//! Any number of occupants may register under a name. The room's creator
//! is its king; if the king leaves, the crown passes to the next occupant.

use std::collections::BTreeMap;

use parlor_room::{CommandError, Game};
use parlor_transport::ConnectionId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Preparing,
    Thinking,
    Scoring,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub letter: String,
    pub words: Vec<String>,
    /// Whether each word was the only one of its kind.
    pub uniques: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub points: u32,
    pub rounds: Vec<Round>,
}

impl Player {
    fn named(name: String) -> Self {
        Self { name, points: 0, rounds: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetitBacState {
    pub round: u32,
    pub time: u32,
    pub phase: Phase,
    pub players: BTreeMap<ConnectionId, Player>,
    pub categories: Vec<String>,
    pub letters: Vec<String>,
    pub king: ConnectionId,
}

impl PetitBacState {
    pub fn new(king: ConnectionId) -> Self {
        Self {
            round: 1,
            time: 0,
            phase: Phase::Preparing,
            players: BTreeMap::new(),
            categories: Vec::new(),
            letters: Vec::new(),
            king,
        }
    }

    fn choose_name(&mut self, sender: ConnectionId, name: String) -> Result<(), CommandError> {
        let name = name.trim().to_owned();
        if name.is_empty() {
            return Err(CommandError::malformed("empty name"));
        }
        if self.players.values().any(|p| p.name == name) {
            return Err(CommandError::illegal(format!("{name} is taken")));
        }
        self.players
            .entry(sender)
            .and_modify(|p| p.name.clone_from(&name))
            .or_insert_with(|| Player::named(name));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "args", rename_all = "snake_case")]
pub enum PetitBacCommand {
    ChooseName(String),
}

pub struct PetitBac;

impl Game for PetitBac {
    type State = PetitBacState;
    type Command = PetitBacCommand;

    fn init(creator: ConnectionId) -> PetitBacState {
        PetitBacState::new(creator)
    }

    fn handle_command(
        state: &mut PetitBacState,
        sender: ConnectionId,
        command: PetitBacCommand,
    ) -> Result<(), CommandError> {
        match command {
            PetitBacCommand::ChooseName(name) => state.choose_name(sender, name),
        }
    }

    fn on_leave(state: &mut PetitBacState, leaver: ConnectionId, remaining: &[ConnectionId]) {
        state.players.remove(&leaver);
        if state.king == leaver {
            if let Some(&next) = remaining.first() {
                state.king = next;
                tracing::debug!(king = %next, "petit bac king changed");
            }
        }
    }
}
