//! Course definitions and game assembly.
//!
//! A course is the declarative description of a hunt: its locations in
//! visiting order, the end location, the known teams and the hint policy.
//! Every team gets a freshly assembled game, rotated so that the team's start
//! location comes first while all other locations are still visited.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use tracing::warn;
use trailhunt_core::error::GameError;
use trailhunt_core::message::ChannelId;

use crate::domain::game::{Game, GamePorts};
use crate::domain::hint::{Hint, HintRelease};
use crate::domain::location::{EndLocation, Location, LocationGraph};
use crate::domain::proof::ProofCode;
use crate::domain::task::{MediaKind, Task};

/// A whole hunt.
#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    /// Locations in visiting order.
    pub locations: Vec<LocationDefinition>,
    /// Where all teams gather at the end.
    pub end_location: EndLocationDefinition,
    /// Teams known before the hunt starts, by channel.
    #[serde(default)]
    pub teams: BTreeMap<ChannelId, TeamDefinition>,
    /// Whether hint requests release hints.
    #[serde(default)]
    pub hints: HintRelease,
}

/// One location of the course.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationDefinition {
    /// Unique name, also used to pick start locations.
    pub name: String,
    /// Secret of the proof code; no proof is required when absent.
    #[serde(default)]
    pub proof: Option<String>,
    /// Printable image of the proof code.
    #[serde(default)]
    pub proof_image: Option<String>,
    /// The task to solve there.
    pub task: TaskDefinition,
}

/// A task and its feedback.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskDefinition {
    /// Text announcing the task (a video URL for video questions).
    pub description: String,
    /// Verification strategy.
    #[serde(flatten)]
    pub kind: TaskKindDefinition,
    /// Hints, in release order.
    #[serde(default)]
    pub hints: Vec<HintDefinition>,
    /// Overrides the default correct-answer feedback.
    #[serde(default)]
    pub good_answer_message: Option<String>,
    /// Overrides the default wrong-answer feedback.
    #[serde(default)]
    pub bad_answer_message: Option<String>,
}

/// Verification strategies, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskKindDefinition {
    /// Exact text answer.
    Question {
        /// The expected answer.
        answer: String,
    },
    /// Exact text answer to a question asked in a video.
    VideoQuestion {
        /// The expected answer.
        answer: String,
    },
    /// Sequence of questions.
    Quiz {
        /// The questions, in order.
        questions: Vec<QuizQuestionDefinition>,
    },
    /// Any attachment.
    Attachment,
    /// A photo.
    Picture,
    /// A video.
    Video,
    /// A sentence of a minimum length.
    SentenceLength {
        /// Minimum number of space-separated words.
        minimum_words: usize,
    },
}

/// One question of a quiz.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizQuestionDefinition {
    /// The question.
    pub question: String,
    /// The expected answer.
    pub answer: String,
    /// Hints for this question.
    #[serde(default)]
    pub hints: Vec<HintDefinition>,
    /// Overrides the default correct-answer feedback.
    #[serde(default)]
    pub good_answer_message: Option<String>,
    /// Overrides the default wrong-answer feedback.
    #[serde(default)]
    pub bad_answer_message: Option<String>,
}

/// A hint.
#[derive(Debug, Clone, Deserialize)]
pub struct HintDefinition {
    /// Hint text.
    pub description: String,
    /// Optional image sent with it.
    #[serde(default)]
    pub image: Option<String>,
    /// Location the hint was written for.
    #[serde(default)]
    pub location: Option<String>,
}

/// The end location.
#[derive(Debug, Clone, Deserialize)]
pub struct EndLocationDefinition {
    /// Its name.
    pub description: String,
    /// Messages sent to every team when the end phase starts.
    #[serde(default)]
    pub messages: Vec<String>,
}

/// A team known in advance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamDefinition {
    /// Team name; taken from the team's first message when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Name of the location the team starts at.
    #[serde(default)]
    pub start_location: Option<String>,
    /// Players, announced at the start of the hunt.
    #[serde(default)]
    pub players: Vec<String>,
}

impl Course {
    /// Checks the course can be assembled into games.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Validation` if the course has no locations, two
    /// locations share a name, or a task cannot be built.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.locations.is_empty() {
            return Err(GameError::Validation(
                "a course needs at least one location".to_owned(),
            ));
        }
        let mut seen = HashSet::new();
        for location in &self.locations {
            if !seen.insert(location.name.as_str()) {
                return Err(GameError::Validation(format!(
                    "duplicate location name '{}'",
                    location.name
                )));
            }
            if matches!(location.task.kind, TaskKindDefinition::Quiz { .. })
                && !location.task.hints.is_empty()
            {
                return Err(GameError::Validation(format!(
                    "quiz '{}' cannot have hints of its own; give them to its questions",
                    location.name
                )));
            }
            location.build(self.hints)?;
        }
        for (channel, team) in &self.teams {
            if let Some(start) = &team.start_location
                && self.location_index(start).is_none()
            {
                warn!(%channel, start_location = %start, "unknown start location in team table");
            }
        }
        Ok(())
    }

    /// Index of the location named `name`, by exact comparison.
    #[must_use]
    pub fn location_index(&self, name: &str) -> Option<usize> {
        self.locations.iter().position(|l| l.name == name)
    }

    /// The configured team for `channel`, if any.
    #[must_use]
    pub fn team(&self, channel: &ChannelId) -> Option<&TeamDefinition> {
        self.teams.get(channel)
    }

    /// Builds the shared end location.
    #[must_use]
    pub fn build_end_location(&self) -> EndLocation {
        EndLocation::new(
            self.end_location.description.clone(),
            self.end_location.messages.clone(),
        )
    }

    /// Assembles a fresh game for the team in `channel`, starting at the
    /// team's configured start location.
    ///
    /// An unknown start location falls back to the first location.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Validation` if a task cannot be built.
    pub fn build_game(&self, channel: &ChannelId, ports: GamePorts) -> Result<Game, GameError> {
        let mut locations = self
            .locations
            .iter()
            .map(|definition| definition.build(self.hints))
            .collect::<Result<Vec<_>, _>>()?;

        let start = self
            .team(channel)
            .and_then(|team| team.start_location.as_deref());
        let index = match start {
            None => 0,
            Some(name) => self.location_index(name).unwrap_or_else(|| {
                warn!(%channel, start_location = name, "unknown start location, using the first");
                0
            }),
        };
        locations.rotate_left(index);

        Ok(Game::new(
            channel.clone(),
            LocationGraph::from_locations(locations),
            ports,
        ))
    }
}

impl LocationDefinition {
    fn build(&self, release: HintRelease) -> Result<Location, GameError> {
        let location = Location::new(self.name.clone(), self.task.build(release)?);
        let Some(secret) = &self.proof else {
            warn!(location = %self.name, "location has no proof code; any message counts as arrival");
            return Ok(location);
        };
        let mut proof = ProofCode::new(secret.clone());
        if let Some(image) = &self.proof_image {
            proof = proof.with_image(image.clone());
        }
        Ok(location.with_proof(proof))
    }
}

impl TaskDefinition {
    fn build(&self, release: HintRelease) -> Result<Task, GameError> {
        let description = self.description.clone();
        let task = match &self.kind {
            TaskKindDefinition::Question { answer } => Task::question(description, answer.clone()),
            TaskKindDefinition::VideoQuestion { answer } => {
                Task::video_question(description, answer.clone())
            }
            TaskKindDefinition::Quiz { questions } => Task::quiz(
                description,
                questions.iter().map(QuizQuestionDefinition::build).collect(),
            )?,
            TaskKindDefinition::Attachment => Task::attachment(description, MediaKind::Any),
            TaskKindDefinition::Picture => Task::picture(description),
            TaskKindDefinition::Video => Task::video(description),
            TaskKindDefinition::SentenceLength { minimum_words } => {
                Task::sentence_length(description, *minimum_words)
            }
        };
        let task = with_feedback(
            task.with_hints(build_hints(&self.hints)),
            self.good_answer_message.as_ref(),
            self.bad_answer_message.as_ref(),
        );
        Ok(task.with_hint_release(release))
    }
}

impl QuizQuestionDefinition {
    fn build(&self) -> Task {
        with_feedback(
            Task::question(self.question.clone(), self.answer.clone())
                .with_hints(build_hints(&self.hints)),
            self.good_answer_message.as_ref(),
            self.bad_answer_message.as_ref(),
        )
    }
}

fn with_feedback(mut task: Task, good: Option<&String>, bad: Option<&String>) -> Task {
    if let Some(message) = good {
        task = task.with_good_answer_message(message.clone());
    }
    if let Some(message) = bad {
        task = task.with_bad_answer_message(message.clone());
    }
    task
}

fn build_hints(definitions: &[HintDefinition]) -> Vec<Hint> {
    definitions
        .iter()
        .map(|d| {
            let mut hint = Hint::new(d.description.clone());
            if let Some(image) = &d.image {
                hint = hint.with_image(image.clone());
            }
            if let Some(location) = &d.location {
                hint = hint.for_location(location.clone());
            }
            hint
        })
        .collect()
}
