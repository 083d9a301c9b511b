//! Locations and the chain that links them.
//!
//! Locations live in an arena owned by a [`LocationGraph`] and point to their
//! successor by index. Every edge goes through [`LocationGraph::link`], which
//! keeps the chain a simple path: no cycles, at most one successor and one
//! predecessor per location, nothing pointing back at the head.

use std::ops::{Index, IndexMut};

use serde::Serialize;
use trailhunt_core::error::GameError;
use trailhunt_core::message::Response;
use trailhunt_core::ports::ImageDecoder;

use super::proof::ProofCode;
use super::replies;
use super::task::{Task, TaskOutcome};

/// Index of a location inside its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LocationId(usize);

/// What a message did at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// The message did not prove presence; nothing changed.
    ProofRejected,
    /// The team arrived and the task was announced.
    Arrived {
        /// True if a proof code was checked to get here.
        proof_checked: bool,
    },
    /// The message was handed to the task.
    Answered(TaskOutcome),
}

/// Replies for one message at a location, and what it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Texts to send back, in order.
    pub replies: Vec<String>,
    /// Effect of the message.
    pub visit: Visit,
}

/// One stop of the hunt.
#[derive(Debug, Clone)]
pub struct Location {
    description: String,
    task: Task,
    proof: Option<ProofCode>,
    next: Option<LocationId>,
    proof_confirmed: bool,
}

impl Location {
    /// Creates a location without a proof code.
    #[must_use]
    pub fn new(description: impl Into<String>, task: Task) -> Self {
        Self {
            description: description.into(),
            task,
            proof: None,
            next: None,
            proof_confirmed: false,
        }
    }

    /// Requires `proof` before the task is revealed.
    #[must_use]
    pub fn with_proof(mut self, proof: ProofCode) -> Self {
        self.proof = Some(proof);
        self
    }

    /// The location's name; unique within a course.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The task to solve here.
    #[must_use]
    pub fn task(&self) -> &Task {
        &self.task
    }

    /// The proof code, if one is required.
    #[must_use]
    pub fn proof(&self) -> Option<&ProofCode> {
        self.proof.as_ref()
    }

    /// Returns true if presence must be proven before the task is revealed.
    #[must_use]
    pub fn requires_proof(&self) -> bool {
        self.proof.is_some()
    }

    /// The successor in the chain.
    #[must_use]
    pub fn next(&self) -> Option<LocationId> {
        self.next
    }

    /// Returns true once the team has arrived here.
    #[must_use]
    pub fn is_proof_confirmed(&self) -> bool {
        self.proof_confirmed
    }

    /// Directions sent when this becomes the next location.
    #[must_use]
    pub fn describe_as_next(&self) -> String {
        replies::go_to(&self.description, self.requires_proof())
    }

    /// Directions sent when this is a team's start location.
    #[must_use]
    pub fn describe_as_start(&self) -> String {
        replies::start_location(&self.description, self.requires_proof())
    }

    /// Marks the team as arrived and announces the task. Idempotent apart
    /// from the replies, which are produced on every call.
    pub fn arrive(&mut self) -> Vec<String> {
        self.proof_confirmed = true;
        vec![
            replies::found_location(&self.description),
            self.task.describe(),
        ]
    }

    /// Handles a message while this is the team's current location.
    ///
    /// Until arrival, the message is checked against the proof code. A
    /// location without a proof code treats the first message as arrival,
    /// whatever it says. After arrival, messages go to the task.
    pub async fn on_message(&mut self, response: &Response, decoder: &dyn ImageDecoder) -> Turn {
        if self.proof_confirmed {
            let feedback = self.task.on_response(response);
            return Turn {
                replies: feedback.replies,
                visit: Visit::Answered(feedback.outcome),
            };
        }

        let proof_checked = if let Some(proof) = &self.proof {
            if !proof.matches(response, decoder).await {
                return Turn {
                    replies: vec![replies::look_for_proof(&self.description)],
                    visit: Visit::ProofRejected,
                };
            }
            true
        } else {
            false
        };

        Turn {
            replies: self.arrive(),
            visit: Visit::Arrived { proof_checked },
        }
    }
}

/// Terminal location that all teams are called to at the end of the hunt.
///
/// It has no proof and no task, and is only reached by a forced transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndLocation {
    description: String,
    messages: Vec<String>,
}

impl EndLocation {
    /// Creates an end location with the messages replayed on arrival.
    #[must_use]
    pub fn new(description: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            description: description.into(),
            messages,
        }
    }

    /// The location's name.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Messages sent to a team when the end phase starts.
    #[must_use]
    pub fn arrival_messages(&self) -> &[String] {
        &self.messages
    }

    /// Reply to any message while a team is on its way here.
    #[must_use]
    pub fn on_message(&self, game_ended: bool) -> String {
        if game_ended {
            replies::GAME_OVER.to_owned()
        } else {
            replies::come_to(&self.description)
        }
    }
}

/// Arena of locations linked into a single path.
#[derive(Debug, Clone, Default)]
pub struct LocationGraph {
    locations: Vec<Location>,
    head: Option<LocationId>,
}

impl LocationGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Chains `locations` in the given order.
    #[must_use]
    pub fn from_locations(locations: impl IntoIterator<Item = Location>) -> Self {
        let mut graph = Self::new();
        for location in locations {
            graph.append_at_tail(location);
        }
        graph
    }

    /// The first location of the chain.
    #[must_use]
    pub fn head(&self) -> Option<LocationId> {
        self.head
    }

    /// Number of locations in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Returns true if the graph holds no locations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Looks up a location by index.
    #[must_use]
    pub fn get(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(id.0)
    }

    /// Finds a location by exact name.
    #[must_use]
    pub fn find(&self, description: &str) -> Option<LocationId> {
        self.locations
            .iter()
            .position(|l| l.description == description)
            .map(LocationId)
    }

    /// Walks the chain from the head.
    pub fn iter(&self) -> impl Iterator<Item = (LocationId, &Location)> + '_ {
        std::iter::successors(self.head, |id| self.locations[id.0].next)
            .take(self.locations.len())
            .map(|id| (id, &self.locations[id.0]))
    }

    /// The last location of the chain.
    #[must_use]
    pub fn tail(&self) -> Option<LocationId> {
        self.iter().last().map(|(id, _)| id)
    }

    /// Adds an unlinked location to the arena. The first location added to an
    /// empty graph becomes the head.
    pub fn push(&mut self, mut location: Location) -> LocationId {
        location.next = None;
        let id = LocationId(self.locations.len());
        self.locations.push(location);
        if self.head.is_none() {
            self.head = Some(id);
        }
        id
    }

    /// Makes `to` the successor of `from`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Validation` if either index is unknown, `from`
    /// already has a successor, `to` already has a predecessor or is the
    /// head, or the link would close a cycle.
    pub fn link(&mut self, from: LocationId, to: LocationId) -> Result<(), GameError> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Err(cycle(from, to));
        }
        if self.locations[from.0].next.is_some() {
            return Err(GameError::Validation(format!(
                "location '{}' already has a successor",
                self.locations[from.0].description
            )));
        }
        if self.head == Some(to) || self.predecessor(to).is_some() {
            return Err(GameError::Validation(format!(
                "location '{}' already has a predecessor",
                self.locations[to.0].description
            )));
        }
        if self.reaches(to, from) {
            return Err(cycle(from, to));
        }

        self.locations[from.0].next = Some(to);
        Ok(())
    }

    /// Attaches `location` after the last location of the chain, or makes it
    /// the head of an empty chain.
    pub fn append_at_tail(&mut self, location: Location) -> LocationId {
        let tail = self.tail();
        let id = self.push(location);
        if let Some(tail) = tail {
            // A fresh index has no predecessor and reaches nothing.
            self.locations[tail.0].next = Some(id);
        }
        id
    }

    /// Splices `location` in right after `anchor`, in front of the anchor's
    /// old successor.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Validation` if `anchor` is unknown.
    pub fn insert_after(
        &mut self,
        anchor: LocationId,
        location: Location,
    ) -> Result<LocationId, GameError> {
        self.check_index(anchor)?;
        let old_next = self.locations[anchor.0].next.take();
        let id = self.push(location);

        let relinked = self
            .link(anchor, id)
            .and_then(|()| old_next.map_or(Ok(()), |old| self.link(id, old)));
        if let Err(error) = relinked {
            self.locations[anchor.0].next = old_next;
            self.locations.pop();
            return Err(error);
        }
        Ok(id)
    }

    fn check_index(&self, id: LocationId) -> Result<(), GameError> {
        if id.0 < self.locations.len() {
            Ok(())
        } else {
            Err(GameError::Validation(format!(
                "unknown location index {}",
                id.0
            )))
        }
    }

    fn predecessor(&self, id: LocationId) -> Option<LocationId> {
        self.locations
            .iter()
            .position(|l| l.next == Some(id))
            .map(LocationId)
    }

    fn reaches(&self, start: LocationId, target: LocationId) -> bool {
        std::iter::successors(Some(start), |id| self.locations[id.0].next)
            .take(self.locations.len())
            .any(|id| id == target)
    }
}

fn cycle(from: LocationId, to: LocationId) -> GameError {
    GameError::Validation(format!(
        "linking location {} to {} would create a cycle",
        from.0, to.0
    ))
}

impl Index<LocationId> for LocationGraph {
    type Output = Location;

    /// # Panics
    ///
    /// Panics if `id` was not issued by this graph.
    fn index(&self, id: LocationId) -> &Location {
        &self.locations[id.0]
    }
}

impl IndexMut<LocationId> for LocationGraph {
    fn index_mut(&mut self, id: LocationId) -> &mut Location {
        &mut self.locations[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::replies;
    use trailhunt_test_support::StubDecoder;

    fn kitchen() -> Location {
        Location::new("Kitchen", Task::question("What time is it?", "now"))
            .with_proof(ProofCode::new("test"))
    }

    fn garden() -> Location {
        Location::new("Garden", Task::question("Where are we?", "garden"))
    }

    fn names(graph: &LocationGraph) -> Vec<&str> {
        graph.iter().map(|(_, l)| l.description()).collect()
    }

    #[test]
    fn test_append_at_tail_keeps_insertion_order() {
        let room = Location::new("Room", Task::question("How are you?", "fine"));
        let graph = LocationGraph::from_locations([kitchen(), garden(), room]);

        assert_eq!(names(&graph), vec!["Kitchen", "Garden", "Room"]);
        assert_eq!(graph.head(), graph.find("Kitchen"));
        assert_eq!(graph.tail(), graph.find("Room"));
    }

    #[test]
    fn test_insert_after_splices_before_old_successor() {
        // Arrange
        let mut graph = LocationGraph::from_locations([kitchen(), garden()]);
        let anchor = graph.find("Kitchen").unwrap();

        // Act
        let room = Location::new("Room", Task::question("How are you?", "fine"));
        let room = graph.insert_after(anchor, room).unwrap();

        // Assert
        assert_eq!(names(&graph), vec!["Kitchen", "Room", "Garden"]);
        assert_eq!(graph[room].next(), graph.find("Garden"));
    }

    #[test]
    fn test_insert_after_tail_extends_chain() {
        let mut graph = LocationGraph::from_locations([kitchen()]);
        let anchor = graph.head().unwrap();

        graph.insert_after(anchor, garden()).unwrap();

        assert_eq!(names(&graph), vec!["Kitchen", "Garden"]);
    }

    #[test]
    fn test_link_rejects_cycles_and_second_predecessors() {
        // Arrange
        let mut graph = LocationGraph::new();
        let a = graph.push(kitchen());
        let b = graph.push(garden());
        let c = graph.push(Location::new("Room", Task::question("?", "!")));
        graph.link(a, b).unwrap();
        graph.link(b, c).unwrap();

        // Act & Assert
        assert!(matches!(graph.link(c, a), Err(GameError::Validation(_))));
        assert!(matches!(graph.link(c, c), Err(GameError::Validation(_))));
        assert!(matches!(graph.link(a, c), Err(GameError::Validation(_))));
        assert!(matches!(
            graph.link(c, LocationId(42)),
            Err(GameError::Validation(_))
        ));
        assert_eq!(names(&graph), vec!["Kitchen", "Garden", "Room"]);
    }

    #[test]
    fn test_find_uses_exact_name() {
        let graph = LocationGraph::from_locations([kitchen(), garden()]);

        assert!(graph.find("Garden").is_some());
        assert!(graph.find("garden").is_none());
        assert!(graph.find("Attic").is_none());
    }

    #[tokio::test]
    async fn test_wrong_proof_leaves_location_unconfirmed() {
        // Arrange
        let mut location = kitchen();
        let decoder = StubDecoder::new();

        // Act
        let turn = location.on_message(&Response::text("now"), &decoder).await;

        // Assert
        assert_eq!(turn.visit, Visit::ProofRejected);
        assert_eq!(turn.replies, vec![replies::look_for_proof("Kitchen")]);
        assert!(!location.is_proof_confirmed());
    }

    #[tokio::test]
    async fn test_proof_confirms_and_announces_task_without_answering() {
        // Arrange
        let mut location = kitchen();
        let decoder = StubDecoder::new();

        // Act
        let turn = location
            .on_message(&Response::text("QB{test}"), &decoder)
            .await;

        // Assert
        assert_eq!(turn.visit, Visit::Arrived { proof_checked: true });
        assert_eq!(
            turn.replies,
            vec![
                "You have found Kitchen!".to_owned(),
                "What time is it?".to_owned()
            ]
        );
        assert!(location.is_proof_confirmed());
    }

    #[tokio::test]
    async fn test_first_message_at_proofless_location_is_consumed_as_arrival() {
        let mut location = garden();
        let decoder = StubDecoder::new();

        let first = location.on_message(&Response::text("garden"), &decoder).await;
        let second = location.on_message(&Response::text("garden"), &decoder).await;

        assert_eq!(first.visit, Visit::Arrived { proof_checked: false });
        assert_eq!(second.visit, Visit::Answered(TaskOutcome::Finished));
    }

    #[test]
    fn test_arrival_is_idempotent() {
        let mut location = kitchen();

        let first = location.arrive();
        let second = location.arrive();

        assert!(location.is_proof_confirmed());
        assert_eq!(first, second);
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_describe_as_next_mentions_proof_only_when_required() {
        assert_eq!(
            kitchen().describe_as_next(),
            "Now go to Kitchen and scan the QR code."
        );
        assert_eq!(garden().describe_as_next(), "Now go to Garden.");
    }

    #[test]
    fn test_end_location_reply_depends_on_game_state() {
        let end = EndLocation::new("the garden", vec!["This is the last location.".into()]);

        assert_eq!(end.on_message(false), "Come to the garden as soon as possible!");
        assert_eq!(end.on_message(true), replies::GAME_OVER);
    }
}
