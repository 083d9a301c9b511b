//! Proof-of-presence codes.

use tracing::{debug, warn};
use trailhunt_core::message::Response;
use trailhunt_core::ports::ImageDecoder;

/// Prefix of the delimited token a team must send, as in `QB{secret}`.
pub const TOKEN_PREFIX: &str = "QB";

/// The code hung up at a location. Teams prove they are there by sending its
/// token as text or a photo of the printed code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofCode {
    secret: String,
    image_path: Option<String>,
}

impl ProofCode {
    /// Creates a code for `secret`.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            image_path: None,
        }
    }

    /// Records where the printable image of this code lives.
    #[must_use]
    pub fn with_image(mut self, image_path: impl Into<String>) -> Self {
        self.image_path = Some(image_path.into());
        self
    }

    /// The raw secret.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// The printable image, if recorded.
    #[must_use]
    pub fn image_path(&self) -> Option<&str> {
        self.image_path.as_deref()
    }

    /// The delimited token, e.g. `QB{kitchen}`.
    #[must_use]
    pub fn token(&self) -> String {
        format!("{TOKEN_PREFIX}{{{}}}", self.secret)
    }

    /// Returns true if `text` contains the token. Case-sensitive.
    #[must_use]
    pub fn text_matches(&self, text: &str) -> bool {
        text.contains(&self.token())
    }

    /// Returns true if the response proves presence, either through its text
    /// or through the code decoded from its first attachment.
    ///
    /// Decode failures count as no match.
    pub async fn matches(&self, response: &Response, decoder: &dyn ImageDecoder) -> bool {
        if self.text_matches(&response.text) {
            return true;
        }
        let Some(url) = response.first_attachment() else {
            return false;
        };

        debug!(url, "decoding proof attachment");
        match decoder.decode(url).await {
            Ok(text) if text.is_empty() => {
                debug!(url, "attachment holds no readable code");
                false
            }
            Ok(text) => self.text_matches(&text),
            Err(error) => {
                warn!(url, %error, "proof attachment could not be decoded");
                false
            }
        }
    }
}
