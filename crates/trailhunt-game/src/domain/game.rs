//! The per-team game: where a team is in its chain and what it has finished.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use trailhunt_core::clock::Clock;
use trailhunt_core::error::GameError;
use trailhunt_core::event::EventMetadata;
use trailhunt_core::message::{ChannelId, Response};
use trailhunt_core::ports::{ImageDecoder, Messenger};
use uuid::Uuid;

use super::events::{
    EndPhaseEntered, GameCompleted, GameEnded, GameEvent, GameEventKind, LocationFinished,
    ProofConfirmed,
};
use super::location::{EndLocation, Location, LocationGraph, LocationId, Visit};
use super::replies;
use super::task::TaskOutcome;

/// The collaborators a game talks to.
#[derive(Clone)]
pub struct GamePorts {
    /// Outbound chat messages.
    pub messenger: Arc<dyn Messenger>,
    /// Image-to-text decoding for photographed proof codes.
    pub decoder: Arc<dyn ImageDecoder>,
    /// Timestamps.
    pub clock: Arc<dyn Clock>,
}

impl fmt::Debug for GamePorts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GamePorts").finish_non_exhaustive()
    }
}

/// Where a team currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    /// A location of the team's own chain.
    Location(LocationId),
    /// The end location shared by all teams.
    End(Arc<EndLocation>),
}

/// Entry of the finished-locations log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinishedLocation {
    /// Index of the location in the game's graph.
    pub location: LocationId,
    /// Its name.
    pub description: String,
    /// When its task was solved.
    pub finished_at: DateTime<Utc>,
}

/// One team's traversal of its location chain.
pub struct Game {
    id: Uuid,
    channel: ChannelId,
    graph: LocationGraph,
    current: Option<Position>,
    finished: Vec<FinishedLocation>,
    ready_for_next_game: bool,
    ended: bool,
    ports: GamePorts,
    sequence: i64,
    uncommitted_events: Vec<GameEvent>,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .field("current", &self.current)
            .field("finished", &self.finished)
            .field("ready_for_next_game", &self.ready_for_next_game)
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Creates a game positioned at the head of `graph`.
    #[must_use]
    pub fn new(channel: ChannelId, graph: LocationGraph, ports: GamePorts) -> Self {
        let current = graph.head().map(Position::Location);
        Self {
            id: Uuid::new_v4(),
            channel,
            graph,
            current,
            finished: Vec::new(),
            ready_for_next_game: true,
            ended: false,
            ports,
            sequence: 0,
            uncommitted_events: Vec::new(),
        }
    }

    /// Game identifier, used as the aggregate id of its events.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The channel the game is played in.
    #[must_use]
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// The team's location chain.
    #[must_use]
    pub fn graph(&self) -> &LocationGraph {
        &self.graph
    }

    /// The first location of the chain.
    #[must_use]
    pub fn start_location(&self) -> Option<&Location> {
        self.graph.head().map(|id| &self.graph[id])
    }

    /// Where the team is; `None` once the chain is exhausted.
    #[must_use]
    pub fn current(&self) -> Option<&Position> {
        self.current.as_ref()
    }

    /// The current location of the chain, if the team is on one.
    #[must_use]
    pub fn current_location(&self) -> Option<&Location> {
        match &self.current {
            Some(Position::Location(id)) => Some(&self.graph[*id]),
            _ => None,
        }
    }

    /// Name of wherever the team currently is.
    #[must_use]
    pub fn current_description(&self) -> Option<&str> {
        match &self.current {
            Some(Position::Location(id)) => Some(self.graph[*id].description()),
            Some(Position::End(end)) => Some(end.description()),
            None => None,
        }
    }

    /// Finished locations in the order they were finished.
    #[must_use]
    pub fn finished_locations(&self) -> &[FinishedLocation] {
        &self.finished
    }

    /// True until the first message or the start signal.
    #[must_use]
    pub fn is_ready_for_next_game(&self) -> bool {
        self.ready_for_next_game
    }

    /// True once the game has been ended.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Events recorded since the last [`Game::take_events`].
    #[must_use]
    pub fn uncommitted_events(&self) -> &[GameEvent] {
        &self.uncommitted_events
    }

    /// Drains the recorded events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }

    /// Directions to the start location, sent when the hunt starts.
    #[must_use]
    pub fn start_location_text(&self) -> Option<String> {
        self.start_location().map(Location::describe_as_start)
    }

    /// Marks the start location as announced so the first message is not
    /// taken as a request for directions.
    pub fn mark_started(&mut self) {
        self.ready_for_next_game = false;
    }

    /// Appends a location after the last one of the chain.
    pub fn append_location(&mut self, location: Location) -> LocationId {
        let id = self.graph.append_at_tail(location);
        if self.current.is_none() && self.finished.is_empty() {
            self.current = Some(Position::Location(id));
        }
        id
    }

    /// Injects a location right after the current one.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Validation` if the team is not on a location of
    /// its chain.
    pub fn insert_after_current(&mut self, location: Location) -> Result<LocationId, GameError> {
        let Some(&Position::Location(current)) = self.current.as_ref() else {
            return Err(GameError::Validation(
                "no current location to insert after".to_owned(),
            ));
        };
        self.graph.insert_after(current, location)
    }

    /// Handles a message from the team.
    ///
    /// # Errors
    ///
    /// Returns `GameError::ConfigurationFault` if the game has no start
    /// location, and `GameError::Transport` if a reply cannot be sent.
    pub async fn on_message_in_game(
        &mut self,
        response: &Response,
        correlation_id: Uuid,
    ) -> Result<(), GameError> {
        let Some(position) = self.current.clone() else {
            if self.finished.is_empty() {
                self.reply(replies::NO_START_LOCATION).await?;
                return Err(GameError::ConfigurationFault {
                    channel: self.channel.clone(),
                    reason: "game has no start location".to_owned(),
                });
            }
            return self.reply(replies::ALL_LOCATIONS_FINISHED).await;
        };

        if self.ready_for_next_game {
            self.ready_for_next_game = false;
            let Some(directions) = self.start_location().map(Location::describe_as_next) else {
                return Err(GameError::ConfigurationFault {
                    channel: self.channel.clone(),
                    reason: "game has no start location".to_owned(),
                });
            };
            return self.reply(&directions).await;
        }

        match position {
            Position::End(end) => self.reply(&end.on_message(self.ended)).await,
            Position::Location(id) => self.on_message_at_location(id, response, correlation_id).await,
        }
    }

    async fn on_message_at_location(
        &mut self,
        id: LocationId,
        response: &Response,
        correlation_id: Uuid,
    ) -> Result<(), GameError> {
        let turn = self.graph[id]
            .on_message(response, self.ports.decoder.as_ref())
            .await;
        self.reply_all(&turn.replies).await?;

        match turn.visit {
            Visit::Arrived {
                proof_checked: true,
            } => {
                let location = self.graph[id].description().to_owned();
                debug!(channel = %self.channel, location = %location, "proof confirmed");
                self.record(
                    GameEventKind::ProofConfirmed(ProofConfirmed { location }),
                    correlation_id,
                );
                Ok(())
            }
            Visit::Answered(TaskOutcome::Finished) => {
                self.finish_location(id, response, correlation_id).await
            }
            _ => Ok(()),
        }
    }

    async fn finish_location(
        &mut self,
        id: LocationId,
        response: &Response,
        correlation_id: Uuid,
    ) -> Result<(), GameError> {
        let description = self.graph[id].description().to_owned();
        info!(channel = %self.channel, location = %description, "location finished");

        self.finished.push(FinishedLocation {
            location: id,
            description: description.clone(),
            finished_at: self.ports.clock.now(),
        });
        self.record(
            GameEventKind::LocationFinished(LocationFinished {
                location: description.clone(),
                response_text: response.text.clone(),
                attachment_urls: response.attachment_urls.clone(),
            }),
            correlation_id,
        );

        let Some(next) = self.graph[id].next() else {
            self.current = None;
            info!(channel = %self.channel, "last location finished");
            self.record(
                GameEventKind::GameCompleted(GameCompleted {
                    last_location: description,
                }),
                correlation_id,
            );
            return self.reply(replies::HUNT_COMPLETED).await;
        };

        self.current = Some(Position::Location(next));
        let directions = self.graph[next].describe_as_next();
        self.reply(&directions).await?;

        if !self.graph[next].requires_proof() {
            let arrival = self.graph[next].arrive();
            self.reply_all(&arrival).await?;
        }
        Ok(())
    }

    /// Forces the game onto the end location and closes it. Idempotent.
    pub fn end(&mut self, end_location: &Arc<EndLocation>, correlation_id: Uuid) {
        let already_ended = self.ended
            && matches!(&self.current, Some(Position::End(e)) if Arc::ptr_eq(e, end_location));
        self.current = Some(Position::End(Arc::clone(end_location)));
        self.ended = true;
        self.ready_for_next_game = false;

        if !already_ended {
            self.record(
                GameEventKind::GameEnded(GameEnded {
                    end_location: end_location.description().to_owned(),
                }),
                correlation_id,
            );
        }
    }

    /// Calls the team to the end location and replays its messages.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Transport` if a message cannot be sent; the
    /// position has changed regardless.
    pub async fn enter_end_phase(
        &mut self,
        end_location: &Arc<EndLocation>,
        correlation_id: Uuid,
    ) -> Result<(), GameError> {
        self.current = Some(Position::End(Arc::clone(end_location)));
        self.record(
            GameEventKind::EndPhaseEntered(EndPhaseEntered {
                end_location: end_location.description().to_owned(),
            }),
            correlation_id,
        );
        for message in end_location.arrival_messages() {
            self.ports
                .messenger
                .broadcast(&self.channel, message)
                .await?;
        }
        Ok(())
    }

    async fn reply(&self, text: &str) -> Result<(), GameError> {
        self.ports.messenger.send_reply(&self.channel, text).await
    }

    async fn reply_all(&self, texts: &[String]) -> Result<(), GameError> {
        for text in texts {
            self.reply(text).await?;
        }
        Ok(())
    }

    fn record(&mut self, kind: GameEventKind, correlation_id: Uuid) {
        self.sequence += 1;
        self.uncommitted_events.push(GameEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                aggregate_id: self.id,
                sequence_number: self.sequence,
                correlation_id,
                occurred_at: self.ports.clock.now(),
            },
            kind,
        });
    }
}
