//! The hunt: every team's game, the registration and naming flow, and the
//! organiser's bulk operations.
//!
//! Each team sits behind its own async mutex. A message holds its team's lock
//! for the whole dispatch, so messages of one team are handled one at a time
//! in arrival order while different teams proceed concurrently.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info, instrument, warn};
use trailhunt_core::error::GameError;
use trailhunt_core::event::DomainEvent;
use trailhunt_core::message::{ChannelId, InboundMessage, Response};
use uuid::Uuid;

use crate::application::course::Course;
use crate::domain::game::{FinishedLocation, GamePorts};
use crate::domain::location::EndLocation;
use crate::domain::replies;
use crate::domain::team::Team;

type TeamHandle = Arc<Mutex<Team>>;

/// Read-only view of a team and its progress.
#[derive(Debug, Clone, Serialize)]
pub struct TeamStatus {
    /// The team's channel.
    pub channel: ChannelId,
    /// The team name, once known.
    pub name: Option<String>,
    /// Players on the roster.
    pub players: Vec<String>,
    /// Name of the location the team is at, if any.
    pub current_location: Option<String>,
    /// Finished locations in order.
    pub finished_locations: Vec<FinishedLocation>,
    /// Whether the next message only asks for directions.
    pub ready_for_next_game: bool,
    /// Whether the team's game has been ended.
    pub ended: bool,
    /// Number of progression events committed so far.
    pub events: usize,
}

/// All teams playing one course.
pub struct Hunt {
    course: Course,
    end_location: Arc<EndLocation>,
    ports: GamePorts,
    teams: RwLock<BTreeMap<ChannelId, TeamHandle>>,
    ended: AtomicBool,
}

impl std::fmt::Debug for Hunt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hunt")
            .field("end_location", &self.end_location)
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}

impl Hunt {
    /// Creates the hunt with a team and game for every entry of the
    /// course's team table. Other channels register on their first message.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Validation` if the course is invalid.
    pub fn new(course: Course, ports: GamePorts) -> Result<Self, GameError> {
        course.validate()?;
        let end_location = Arc::new(course.build_end_location());

        let mut teams = BTreeMap::new();
        for (channel, definition) in &course.teams {
            let game = course.build_game(channel, ports.clone())?;
            let team = Team::new(channel.clone(), definition.name.clone(), game)
                .with_players(definition.players.clone());
            teams.insert(channel.clone(), Arc::new(Mutex::new(team)));
        }
        info!(
            teams = teams.len(),
            locations = course.locations.len(),
            "hunt prepared"
        );

        Ok(Self {
            course,
            end_location,
            ports,
            teams: RwLock::new(teams),
            ended: AtomicBool::new(false),
        })
    }

    /// The course being played.
    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    /// The end location shared by all teams.
    #[must_use]
    pub fn end_location(&self) -> &Arc<EndLocation> {
        &self.end_location
    }

    /// Whether `end_all_games` has run.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }

    /// Channels of all registered teams.
    pub async fn channels(&self) -> Vec<ChannelId> {
        self.teams.read().await.keys().cloned().collect()
    }

    /// Looks up the team playing in `channel`.
    pub async fn team(&self, channel: &ChannelId) -> Option<Arc<Mutex<Team>>> {
        let team = self.teams.read().await.get(channel).cloned();
        if team.is_none() {
            debug!(%channel, "unknown team");
        }
        team
    }

    /// Progress of the team playing in `channel`.
    pub async fn team_status(&self, channel: &ChannelId) -> Option<TeamStatus> {
        let handle = self.team(channel).await?;
        let team = handle.lock().await;
        let game = team.game();
        Some(TeamStatus {
            channel: team.channel().clone(),
            name: team.name().map(str::to_owned),
            players: team.players().to_vec(),
            current_location: game.current_description().map(str::to_owned),
            finished_locations: game.finished_locations().to_vec(),
            ready_for_next_game: game.is_ready_for_next_game(),
            ended: game.is_ended(),
            events: team.history().len(),
        })
    }

    /// Handles one inbound chat message.
    ///
    /// # Errors
    ///
    /// Returns `GameError::ConfigurationFault` if the team's game cannot be
    /// played, and `GameError::Transport` if a reply cannot be sent.
    pub async fn on_team_message(&self, message: InboundMessage) -> Result<(), GameError> {
        self.on_team_message_with(message, |_| ()).await
    }

    /// Handles one inbound chat message, then runs `collect` while the team
    /// is still locked. Nothing else can message the team in between, so
    /// `collect` sees exactly the output of this message.
    ///
    /// # Errors
    ///
    /// Same as [`Hunt::on_team_message`]; `collect` does not run on error.
    #[instrument(skip(self, message, collect), fields(channel = %message.channel_id))]
    pub async fn on_team_message_with<R, F>(
        &self,
        message: InboundMessage,
        collect: F,
    ) -> Result<R, GameError>
    where
        F: FnOnce(&ChannelId) -> R + Send,
        R: Send,
    {
        let channel = message.channel_id.clone();
        let team = self.handle_message(message).await?;
        let collected = collect(&channel);
        drop(team);
        Ok(collected)
    }

    async fn handle_message(
        &self,
        message: InboundMessage,
    ) -> Result<OwnedMutexGuard<Team>, GameError> {
        let correlation_id = Uuid::new_v4();
        let InboundMessage {
            channel_id,
            response,
        } = message;

        let mut team = match self.team(&channel_id).await {
            Some(handle) => handle.lock_owned().await,
            None => match self.register(&channel_id, correlation_id).await? {
                Registration::New(mut guard) => {
                    self.greet(&mut guard, &response, correlation_id).await?;
                    return Ok(guard);
                }
                Registration::Existing(guard) => guard,
            },
        };

        if team.name().is_none() {
            let name = response.text.trim();
            if name.is_empty() {
                self.reply(&channel_id, replies::WHAT_IS_TEAM_NAME).await?;
                return Ok(team);
            }
            team.set_name(name);
            info!(channel = %channel_id, team = name, "team named");
            self.reply(&channel_id, &replies::welcome(name)).await?;
        }

        self.dispatch(&mut team, &response, correlation_id).await?;
        Ok(team)
    }

    /// Starts the hunt: instructions, rosters, then every team's start
    /// location. Failed sends are logged and skipped.
    #[instrument(skip(self))]
    pub async fn start(&self) {
        let teams = self.handles().await;
        for handle in &teams {
            let team = handle.lock().await;
            self.broadcast(team.channel(), replies::INSTRUCTIONS).await;
        }
        for handle in &teams {
            let team = handle.lock().await;
            if !team.players().is_empty() {
                self.broadcast(team.channel(), &replies::roster(team.players()))
                    .await;
            }
        }
        for handle in &teams {
            let mut team = handle.lock().await;
            if let Some(text) = team.game().start_location_text() {
                self.broadcast(team.channel(), &text).await;
            }
            team.game_mut().mark_started();
        }
        info!(teams = teams.len(), "hunt started");
    }

    /// Calls every team to the end location.
    #[instrument(skip(self))]
    pub async fn enter_end_phase(&self) {
        let correlation_id = Uuid::new_v4();
        let teams = self.handles().await;
        for handle in &teams {
            let mut team = handle.lock().await;
            let result = team
                .game_mut()
                .enter_end_phase(&self.end_location, correlation_id)
                .await;
            if let Err(error) = result {
                warn!(channel = %team.channel(), %error, "end phase broadcast failed");
            }
            log_committed(&mut team);
        }
        info!(teams = teams.len(), end_location = %self.end_location.description(), "end phase entered");
    }

    /// Ends every game and tells every team. Runs once; later calls do
    /// nothing.
    #[instrument(skip(self))]
    pub async fn end_all_games(&self) {
        if self.ended.swap(true, Ordering::SeqCst) {
            debug!("hunt already ended");
            return;
        }
        let correlation_id = Uuid::new_v4();
        let teams = self.handles().await;
        for handle in &teams {
            let mut team = handle.lock().await;
            team.game_mut().end(&self.end_location, correlation_id);
            log_committed(&mut team);
            self.broadcast(team.channel(), replies::GAME_OVER).await;
        }
        info!(teams = teams.len(), "hunt ended");
    }

    async fn register(
        &self,
        channel: &ChannelId,
        correlation_id: Uuid,
    ) -> Result<Registration, GameError> {
        let mut teams = self.teams.write().await;
        if let Some(existing) = teams.get(channel) {
            let handle = Arc::clone(existing);
            drop(teams);
            return Ok(Registration::Existing(handle.lock_owned().await));
        }

        let game = self.course.build_game(channel, self.ports.clone())?;
        let mut team = Team::new(channel.clone(), None, game);
        if self.is_ended() {
            team.set_name(replies::LATE_TEAM_NAME);
            team.game_mut().end(&self.end_location, correlation_id);
        }

        let handle = Arc::new(Mutex::new(team));
        // Locked before publishing so the greeting precedes any later message.
        let guard = Arc::clone(&handle).lock_owned().await;
        teams.insert(channel.clone(), handle);
        info!(%channel, "team registered");
        Ok(Registration::New(guard))
    }

    async fn greet(
        &self,
        team: &mut Team,
        response: &Response,
        correlation_id: Uuid,
    ) -> Result<(), GameError> {
        if team.game().is_ended() {
            return self.dispatch(team, response, correlation_id).await;
        }
        self.reply(team.channel(), replies::ASK_TEAM_NAME).await
    }

    async fn dispatch(
        &self,
        team: &mut Team,
        response: &Response,
        correlation_id: Uuid,
    ) -> Result<(), GameError> {
        let result = team
            .game_mut()
            .on_message_in_game(response, correlation_id)
            .await;
        log_committed(team);
        if let Err(error) = &result {
            warn!(channel = %team.channel(), %error, "message dispatch failed");
        }
        result
    }

    async fn handles(&self) -> Vec<TeamHandle> {
        self.teams.read().await.values().cloned().collect()
    }

    async fn reply(&self, channel: &ChannelId, text: &str) -> Result<(), GameError> {
        self.ports.messenger.send_reply(channel, text).await
    }

    async fn broadcast(&self, channel: &ChannelId, text: &str) {
        if let Err(error) = self.ports.messenger.broadcast(channel, text).await {
            warn!(%channel, %error, "broadcast failed");
        }
    }
}

enum Registration {
    New(OwnedMutexGuard<Team>),
    Existing(OwnedMutexGuard<Team>),
}

fn log_committed(team: &mut Team) {
    let channel = team.channel().clone();
    for event in team.commit_events() {
        info!(
            %channel,
            event_type = event.event_type(),
            sequence = event.metadata().sequence_number,
            correlation_id = %event.metadata().correlation_id,
            "game event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailhunt_core::ports::Messenger;
    use trailhunt_test_support::{
        Delivery, FailingMessenger, FixedClock, RecordingMessenger, StubDecoder,
    };

    const COURSE: &str = r"
locations:
  - name: the kitchen
    proof: kitchen
    task:
      kind: question
      description: What is 2+2?
      answer: '4'
  - name: the hall
    proof: hall
    task:
      kind: sentence_length
      description: Describe the hall in three words.
      minimum_words: 3
end_location:
  description: the garden
  messages:
    - Bring your score card.
teams:
  owls:
    name: Owls
    start_location: the hall
    players: [Ann, Bo]
";

    fn course() -> Course {
        serde_yaml::from_str(COURSE).unwrap()
    }

    fn hunt_with(messenger: Arc<dyn Messenger>) -> Hunt {
        let ports = GamePorts {
            messenger,
            decoder: Arc::new(StubDecoder::new()),
            clock: Arc::new(FixedClock::default()),
        };
        Hunt::new(course(), ports).unwrap()
    }

    fn hunt() -> (Hunt, Arc<RecordingMessenger>) {
        let messenger = Arc::new(RecordingMessenger::new());
        let hunt = hunt_with(Arc::clone(&messenger) as Arc<dyn Messenger>);
        (hunt, messenger)
    }

    async fn send(hunt: &Hunt, channel: &str, text: &str) {
        hunt.on_team_message(InboundMessage::new(channel, Response::text(text)))
            .await
            .unwrap();
    }

    async fn registered(hunt: &Hunt, messenger: &RecordingMessenger, channel: &str) {
        send(hunt, channel, "hi").await;
        messenger.take();
    }

    #[tokio::test]
    async fn test_configured_teams_exist_from_startup() {
        let (hunt, messenger) = hunt();

        assert_eq!(hunt.channels().await, vec![ChannelId::new("owls")]);
        let status = hunt.team_status(&ChannelId::new("owls")).await.unwrap();
        assert_eq!(status.name.as_deref(), Some("Owls"));
        assert_eq!(status.players, vec!["Ann".to_owned(), "Bo".to_owned()]);
        assert_eq!(status.current_location.as_deref(), Some("the hall"));
        assert!(hunt.team(&ChannelId::new("nobody")).await.is_none());
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_channels_register_on_first_message() {
        let (hunt, _) = hunt();

        send(&hunt, "new-team", "hi").await;

        assert_eq!(
            hunt.channels().await,
            vec![ChannelId::new("new-team"), ChannelId::new("owls")]
        );
    }

    #[tokio::test]
    async fn test_unknown_channel_is_greeted_and_asked_for_a_name() {
        // Arrange
        let (hunt, messenger) = hunt();
        let channel = ChannelId::new("new-team");

        // Act
        send(&hunt, "new-team", "hi").await;

        // Assert
        assert_eq!(messenger.texts_for(&channel), vec![replies::ASK_TEAM_NAME]);
        let status = hunt.team_status(&channel).await.unwrap();
        assert_eq!(status.name, None);
        assert_eq!(status.current_location.as_deref(), Some("the kitchen"));
    }

    #[tokio::test]
    async fn test_blank_name_is_asked_again() {
        let (hunt, messenger) = hunt();
        let channel = ChannelId::new("new-team");
        registered(&hunt, &messenger, "new-team").await;

        send(&hunt, "new-team", "   ").await;

        assert_eq!(messenger.texts_for(&channel), vec![replies::WHAT_IS_TEAM_NAME]);
    }

    #[tokio::test]
    async fn test_naming_message_continues_into_the_game() {
        // Arrange
        let (hunt, messenger) = hunt();
        let channel = ChannelId::new("new-team");
        registered(&hunt, &messenger, "new-team").await;

        // Act
        send(&hunt, "new-team", " Foxes ").await;

        // Assert
        assert_eq!(
            messenger.texts_for(&channel),
            vec![
                "Welcome, Foxes!".to_owned(),
                "Now go to the kitchen and scan the QR code.".to_owned(),
            ]
        );
        let status = hunt.team_status(&channel).await.unwrap();
        assert_eq!(status.name.as_deref(), Some("Foxes"));
        assert!(!status.ready_for_next_game);
    }

    #[tokio::test]
    async fn test_configured_team_message_before_start_gets_directions() {
        // Arrange
        let (hunt, messenger) = hunt();
        let channel = ChannelId::new("owls");

        // Act
        send(&hunt, "owls", "hello").await;

        // Assert
        assert_eq!(
            messenger.texts_for(&channel),
            vec!["Now go to the hall and scan the QR code.".to_owned()]
        );
    }

    #[tokio::test]
    async fn test_start_before_any_message_reaches_configured_teams() {
        // Arrange
        let (hunt, messenger) = hunt();

        // Act
        hunt.start().await;

        // Assert
        let sent = messenger.sent();
        assert!(sent.iter().all(|m| m.delivery == Delivery::Broadcast));
        assert_eq!(
            messenger.texts_for(&ChannelId::new("owls")),
            vec![
                replies::INSTRUCTIONS.to_owned(),
                "Your team consists of: Ann, Bo.".to_owned(),
                "Your start location is the hall. Go there and scan the QR code to receive the first task."
                    .to_owned(),
            ]
        );
        let status = hunt.team_status(&ChannelId::new("owls")).await.unwrap();
        assert!(!status.ready_for_next_game);
    }

    #[tokio::test]
    async fn test_scanning_after_start_reaches_the_task() {
        let (hunt, messenger) = hunt();
        let channel = ChannelId::new("owls");
        hunt.start().await;
        messenger.take();

        send(&hunt, "owls", "QB{hall}").await;

        assert_eq!(
            messenger.texts_for(&channel),
            vec![
                "You have found the hall!".to_owned(),
                "Describe the hall in three words.".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn test_end_phase_moves_everyone_to_the_end_location() {
        // Arrange
        let (hunt, messenger) = hunt();
        let channel = ChannelId::new("owls");
        hunt.start().await;
        messenger.take();

        // Act
        hunt.enter_end_phase().await;
        send(&hunt, "owls", "where now?").await;

        // Assert
        assert_eq!(
            messenger.texts_for(&channel),
            vec![
                "Bring your score card.".to_owned(),
                "Come to the garden as soon as possible!".to_owned(),
            ]
        );
        let status = hunt.team_status(&channel).await.unwrap();
        assert_eq!(status.current_location.as_deref(), Some("the garden"));
        assert_eq!(status.events, 1);
    }

    #[tokio::test]
    async fn test_end_all_games_is_idempotent() {
        // Arrange
        let (hunt, messenger) = hunt();
        let channel = ChannelId::new("owls");

        // Act
        hunt.end_all_games().await;
        hunt.end_all_games().await;

        // Assert
        assert!(hunt.is_ended());
        assert_eq!(messenger.texts_for(&channel), vec![replies::GAME_OVER]);
        let status = hunt.team_status(&channel).await.unwrap();
        assert!(status.ended);
        assert_eq!(status.events, 1);
    }

    #[tokio::test]
    async fn test_late_team_gets_game_over() {
        // Arrange
        let (hunt, messenger) = hunt();
        hunt.end_all_games().await;
        let channel = ChannelId::new("latecomers");

        // Act
        send(&hunt, "latecomers", "hello?").await;

        // Assert
        assert_eq!(messenger.texts_for(&channel), vec![replies::GAME_OVER]);
        let status = hunt.team_status(&channel).await.unwrap();
        assert_eq!(status.name.as_deref(), Some(replies::LATE_TEAM_NAME));
        assert!(status.ended);
    }

    #[tokio::test]
    async fn test_failed_broadcasts_do_not_abort_bulk_operations() {
        // Arrange
        let hunt = hunt_with(Arc::new(FailingMessenger));

        // Act
        hunt.start().await;
        hunt.end_all_games().await;

        // Assert
        let status = hunt.team_status(&ChannelId::new("owls")).await.unwrap();
        assert!(!status.ready_for_next_game);
        assert!(status.ended);
    }

    #[tokio::test]
    async fn test_collect_runs_while_the_team_is_locked() {
        // Arrange
        let (hunt, messenger) = hunt();
        hunt.start().await;
        messenger.take();
        let owls = ChannelId::new("owls");

        // Act
        let (collected, other) = tokio::join!(
            hunt.on_team_message_with(
                InboundMessage::new("owls", Response::text("QB{hall}")),
                |channel| messenger.take_for(channel),
            ),
            hunt.on_team_message_with(
                InboundMessage::new("owls", Response::text("too short")),
                |channel| messenger.take_for(channel),
            ),
        );

        // Assert
        let collected = collected.unwrap();
        let other = other.unwrap();
        assert_eq!(
            collected,
            vec![
                "You have found the hall!".to_owned(),
                "Describe the hall in three words.".to_owned(),
            ]
        );
        assert_eq!(other.len(), 1);
        assert!(!collected.contains(&other[0]));
        assert!(messenger.texts_for(&owls).is_empty());
    }

    #[tokio::test]
    async fn test_failed_reply_is_reported() {
        let hunt = hunt_with(Arc::new(FailingMessenger));

        let result = hunt
            .on_team_message(InboundMessage::new("owls", Response::text("hi")))
            .await;

        assert!(matches!(result, Err(GameError::Transport(_))));
    }

    #[test]
    fn test_invalid_course_is_rejected() {
        let mut course = course();
        course.locations.clear();
        let ports = GamePorts {
            messenger: Arc::new(RecordingMessenger::new()),
            decoder: Arc::new(StubDecoder::new()),
            clock: Arc::new(FixedClock::default()),
        };

        assert!(matches!(
            Hunt::new(course, ports),
            Err(GameError::Validation(_))
        ));
    }
}
