//! Test decoders: `ImageDecoder` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use trailhunt_core::error::DecodeError;
use trailhunt_core::ports::ImageDecoder;

/// A decoder that answers from a fixed URL → text table and records every URL
/// it was asked to decode. Unknown URLs decode to an empty string, like an
/// image without a readable code.
#[derive(Debug, Default)]
pub struct StubDecoder {
    table: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl StubDecoder {
    /// Creates a decoder with no known images.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the text encoded in the image at `url`.
    #[must_use]
    pub fn with_image(mut self, url: &str, text: &str) -> Self {
        self.table.insert(url.to_owned(), text.to_owned());
        self
    }

    /// Returns every URL passed to `decode`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageDecoder for StubDecoder {
    async fn decode(&self, image_url: &str) -> Result<String, DecodeError> {
        self.requested.lock().unwrap().push(image_url.to_owned());
        Ok(self.table.get(image_url).cloned().unwrap_or_default())
    }
}

/// A decoder whose service is always down. Useful for testing that decode
/// failures are treated as "no match".
#[derive(Debug)]
pub struct FailingDecoder;

#[async_trait]
impl ImageDecoder for FailingDecoder {
    async fn decode(&self, _image_url: &str) -> Result<String, DecodeError> {
        Err(DecodeError::Unavailable("connection refused".into()))
    }
}
