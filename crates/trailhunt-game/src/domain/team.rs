//! Teams and their game.

use trailhunt_core::message::ChannelId;

use super::events::GameEvent;
use super::game::Game;

/// A team playing in one channel.
#[derive(Debug)]
pub struct Team {
    channel: ChannelId,
    name: Option<String>,
    players: Vec<String>,
    game: Game,
    history: Vec<GameEvent>,
}

impl Team {
    /// Creates a team owning `game`.
    #[must_use]
    pub fn new(channel: ChannelId, name: Option<String>, game: Game) -> Self {
        Self {
            channel,
            name,
            players: Vec::new(),
            game,
            history: Vec::new(),
        }
    }

    /// Sets the roster announced at the start of the hunt.
    #[must_use]
    pub fn with_players(mut self, players: Vec<String>) -> Self {
        self.players = players;
        self
    }

    /// The team's channel.
    #[must_use]
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// The team name, once known.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Names the team. A name can only be set once; returns false if the
    /// team already had one.
    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        if self.name.is_some() {
            return false;
        }
        self.name = Some(name.into());
        true
    }

    /// The roster.
    #[must_use]
    pub fn players(&self) -> &[String] {
        &self.players
    }

    /// The team's game.
    #[must_use]
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// The team's game, mutably.
    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    /// Moves the game's recorded events into the team history and returns
    /// the newly moved ones.
    pub fn commit_events(&mut self) -> &[GameEvent] {
        let start = self.history.len();
        self.history.extend(self.game.take_events());
        &self.history[start..]
    }

    /// Every event committed so far, oldest first.
    #[must_use]
    pub fn history(&self) -> &[GameEvent] {
        &self.history
    }
}
