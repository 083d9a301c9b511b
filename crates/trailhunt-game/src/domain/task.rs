//! Tasks and the verification engine.
//!
//! A task checks whether a response answers its challenge. The verification
//! strategy is a tagged variant; everything around it (hint requests,
//! feedback, hint prompts) is shared by all variants. A quiz chains several
//! sub-tasks behind a cursor and only finishes once the last one is answered.

use trailhunt_core::error::GameError;
use trailhunt_core::message::Response;

use super::hint::{Hint, HintDispenser, HintRelease};
use super::replies;

/// Substring that turns a response into a hint request.
pub const HINT_KEYWORD: &str = "hint";

/// Media an attachment task asks for.
///
/// Only the presence of an attachment is checked; the kind is descriptive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Any attachment.
    Any,
    /// A photo.
    Picture,
    /// A video.
    Video,
}

/// Verification strategy of a task.
#[derive(Debug, Clone)]
pub enum TaskKind {
    /// The response text must equal the answer exactly.
    Question {
        /// The expected answer.
        answer: String,
    },
    /// The response must carry at least one attachment.
    Attachment {
        /// What the team is asked to send.
        media: MediaKind,
    },
    /// The response must contain at least this many space-separated words.
    SentenceLength {
        /// Minimum word count.
        minimum_words: usize,
    },
    /// A sequence of sub-tasks answered one after the other.
    Quiz(Quiz),
}

/// Whether a response finished the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The task is still open.
    Pending,
    /// The task is solved; the location is finished.
    Finished,
}

/// Replies produced by one response to a task, and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    /// Texts to send back, in order.
    pub replies: Vec<String>,
    /// Whether the task is now solved.
    pub outcome: TaskOutcome,
}

impl Feedback {
    fn pending(replies: Vec<String>) -> Self {
        Self {
            replies,
            outcome: TaskOutcome::Pending,
        }
    }

    fn finished(replies: Vec<String>) -> Self {
        Self {
            replies,
            outcome: TaskOutcome::Finished,
        }
    }
}

/// A challenge that must be answered before a team may leave a location.
#[derive(Debug, Clone)]
pub struct Task {
    description: String,
    hints: HintDispenser,
    good_answer_message: String,
    bad_answer_message: String,
    kind: TaskKind,
}

impl Task {
    fn with_kind(description: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            description: description.into(),
            hints: HintDispenser::default(),
            good_answer_message: replies::GOOD_ANSWER.to_owned(),
            bad_answer_message: replies::BAD_ANSWER.to_owned(),
            kind,
        }
    }

    /// A question answered by exact text.
    #[must_use]
    pub fn question(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self::with_kind(
            question,
            TaskKind::Question {
                answer: answer.into(),
            },
        )
    }

    /// A question asked in a video; the video URL is the description.
    #[must_use]
    pub fn video_question(video_url: impl Into<String>, answer: impl Into<String>) -> Self {
        Self::question(video_url, answer)
    }

    /// A task answered by sending any attachment of the given kind.
    #[must_use]
    pub fn attachment(description: impl Into<String>, media: MediaKind) -> Self {
        Self::with_kind(description, TaskKind::Attachment { media })
    }

    /// A task answered by sending a photo.
    #[must_use]
    pub fn picture(description: impl Into<String>) -> Self {
        Self::attachment(description, MediaKind::Picture)
    }

    /// A task answered by sending a video.
    #[must_use]
    pub fn video(description: impl Into<String>) -> Self {
        Self::attachment(description, MediaKind::Video)
    }

    /// A task answered by a sentence of at least `minimum_words` words.
    #[must_use]
    pub fn sentence_length(description: impl Into<String>, minimum_words: usize) -> Self {
        Self::with_kind(description, TaskKind::SentenceLength { minimum_words })
    }

    /// A quiz over `questions`, asked in order.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Validation` if `questions` is empty or contains a
    /// quiz.
    pub fn quiz(description: impl Into<String>, questions: Vec<Task>) -> Result<Self, GameError> {
        Ok(Self::with_kind(description, TaskKind::Quiz(Quiz::new(questions)?)))
    }

    /// Replaces the hints.
    #[must_use]
    pub fn with_hints(mut self, hints: Vec<Hint>) -> Self {
        self.hints = HintDispenser::new(hints, self.hints.release());
        self
    }

    /// Sets the hint release policy, for this task and any quiz questions.
    #[must_use]
    pub fn with_hint_release(mut self, release: HintRelease) -> Self {
        self.hints.set_release(release);
        if let TaskKind::Quiz(quiz) = &mut self.kind {
            for question in &mut quiz.questions {
                question.hints.set_release(release);
            }
        }
        self
    }

    /// Overrides the feedback for a correct answer.
    #[must_use]
    pub fn with_good_answer_message(mut self, message: impl Into<String>) -> Self {
        self.good_answer_message = message.into();
        self
    }

    /// Overrides the feedback for a wrong answer.
    #[must_use]
    pub fn with_bad_answer_message(mut self, message: impl Into<String>) -> Self {
        self.bad_answer_message = message.into();
        self
    }

    /// The task's own description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The verification strategy.
    #[must_use]
    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    /// The hints and how many were given.
    #[must_use]
    pub fn hints(&self) -> &HintDispenser {
        &self.hints
    }

    /// Feedback for a correct answer.
    #[must_use]
    pub fn good_answer_message(&self) -> &str {
        &self.good_answer_message
    }

    /// Feedback for a wrong answer.
    #[must_use]
    pub fn bad_answer_message(&self) -> &str {
        &self.bad_answer_message
    }

    /// The text announcing this task on arrival.
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.kind {
            TaskKind::Quiz(quiz) => match quiz.current() {
                Some(question) => replies::quiz_question(
                    &self.description,
                    question.description(),
                    quiz.cursor == 0,
                ),
                None => self.description.clone(),
            },
            _ => self.description.clone(),
        }
    }

    /// Returns true if the response asks for a hint.
    #[must_use]
    pub fn is_hint_request(response: &Response) -> bool {
        response.text.contains(HINT_KEYWORD)
    }

    /// Returns true if the response answers the task. For a quiz, this checks
    /// the question at the cursor.
    #[must_use]
    pub fn verify(&self, response: &Response) -> bool {
        match &self.kind {
            TaskKind::Question { answer } => response.text == *answer,
            TaskKind::Attachment { .. } => response.has_attachments(),
            TaskKind::SentenceLength { minimum_words } => {
                response.text.trim().split(' ').count() >= *minimum_words
            }
            TaskKind::Quiz(quiz) => quiz.current().is_some_and(|q| q.verify(response)),
        }
    }

    /// Handles a response sent while this task is open.
    pub fn on_response(&mut self, response: &Response) -> Feedback {
        if let TaskKind::Quiz(quiz) = &mut self.kind {
            return quiz.on_response(response);
        }

        if Self::is_hint_request(response) {
            Feedback::pending(self.hints.dispense())
        } else if self.verify(response) {
            Feedback::finished(vec![self.good_answer_message.clone()])
        } else {
            Feedback::pending(self.bad_answer_replies())
        }
    }

    fn bad_answer_replies(&self) -> Vec<String> {
        let mut out = vec![self.bad_answer_message.clone()];
        if let Some(proposal) = self.hints.proposal() {
            out.push(proposal.to_owned());
        }
        out
    }
}

/// Ordered sub-questions and the cursor of the question being asked.
#[derive(Debug, Clone)]
pub struct Quiz {
    questions: Vec<Task>,
    cursor: usize,
}

impl Quiz {
    fn new(questions: Vec<Task>) -> Result<Self, GameError> {
        if questions.is_empty() {
            return Err(GameError::Validation(
                "a quiz needs at least one question".to_owned(),
            ));
        }
        if questions
            .iter()
            .any(|q| matches!(q.kind, TaskKind::Quiz(_)))
        {
            return Err(GameError::Validation(
                "a quiz cannot contain another quiz".to_owned(),
            ));
        }
        Ok(Self {
            questions,
            cursor: 0,
        })
    }

    /// Index of the question being asked; equals `len()` once complete.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false; empty quizzes are rejected at construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Returns true once every question has been answered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cursor == self.questions.len()
    }

    /// The question being asked, if the quiz is not complete.
    #[must_use]
    pub fn current(&self) -> Option<&Task> {
        self.questions.get(self.cursor)
    }

    /// The sub-questions, in order.
    #[must_use]
    pub fn questions(&self) -> &[Task] {
        &self.questions
    }

    fn on_response(&mut self, response: &Response) -> Feedback {
        let total = self.questions.len();
        let Some(question) = self.questions.get_mut(self.cursor) else {
            return Feedback::pending(Vec::new());
        };

        if Task::is_hint_request(response) {
            return Feedback::pending(question.hints.dispense());
        }
        if !question.verify(response) {
            return Feedback::pending(question.bad_answer_replies());
        }

        let mut out = vec![question.good_answer_message.clone()];
        self.cursor += 1;

        if self.cursor == total {
            out.push(replies::QUIZ_COMPLETE.to_owned());
            return Feedback::finished(out);
        }

        let upcoming = self.questions[self.cursor].description();
        if self.cursor == total - 1 {
            out.push(replies::last_question(upcoming));
        } else {
            out.push(replies::next_question(upcoming));
        }
        Feedback::pending(out)
    }
}
