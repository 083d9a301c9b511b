//! Hints and the counter that gates their release.

use serde::{Deserialize, Serialize};

use super::replies;

/// A clue that can be requested while a task is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    description: String,
    image_path: Option<String>,
    location: Option<String>,
}

impl Hint {
    /// Creates a text-only hint.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            image_path: None,
            location: None,
        }
    }

    /// Attaches an image (path or URL) that is sent after the description.
    #[must_use]
    pub fn with_image(mut self, image_path: impl Into<String>) -> Self {
        self.image_path = Some(image_path.into());
        self
    }

    /// Records the location the hint applies to. Informational only.
    #[must_use]
    pub fn for_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// The hint text.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The hint image, if any.
    #[must_use]
    pub fn image_path(&self) -> Option<&str> {
        self.image_path.as_deref()
    }

    /// The location the hint was written for, if recorded.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

/// Whether hint requests actually release hints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintRelease {
    /// Hint requests are always answered with "no hints".
    #[default]
    Withheld,
    /// Each request releases the next hint until none are left.
    Incremental,
}

/// Ordered hints of one task plus the number already given out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HintDispenser {
    hints: Vec<Hint>,
    given: usize,
    release: HintRelease,
}

impl HintDispenser {
    /// Creates a dispenser over `hints`.
    #[must_use]
    pub fn new(hints: Vec<Hint>, release: HintRelease) -> Self {
        Self {
            hints,
            given: 0,
            release,
        }
    }

    /// Number of hints released so far.
    #[must_use]
    pub fn given(&self) -> usize {
        self.given
    }

    /// Total number of hints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hints.len()
    }

    /// Returns true if the task has no hints at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    /// The hints, in release order.
    #[must_use]
    pub fn hints(&self) -> &[Hint] {
        &self.hints
    }

    /// Returns true while some hints have not been released.
    #[must_use]
    pub fn has_unclaimed(&self) -> bool {
        self.given < self.hints.len()
    }

    /// The release policy.
    #[must_use]
    pub fn release(&self) -> HintRelease {
        self.release
    }

    pub(crate) fn set_release(&mut self, release: HintRelease) {
        self.release = release;
    }

    /// Answers a hint request.
    pub fn dispense(&mut self) -> Vec<String> {
        if self.release == HintRelease::Withheld {
            return vec![replies::NO_HINTS.to_owned()];
        }
        let Some(hint) = self.hints.get(self.given) else {
            return vec![replies::NO_HINTS.to_owned()];
        };

        let mut out = vec![hint.description.clone()];
        if let Some(image) = &hint.image_path {
            out.push(image.clone());
        }
        self.given += 1;
        out
    }

    /// Prompt appended to wrong-answer feedback, if hints remain.
    #[must_use]
    pub fn proposal(&self) -> Option<&'static str> {
        self.has_unclaimed()
            .then(|| replies::hint_proposal(self.given == 0))
    }
}
