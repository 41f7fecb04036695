//! Driving port for frame number recognition.

use async_trait::async_trait;

use crate::domain::{Error, FrameNumberReading, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameNumberRecognition: Send + Sync {
    /// Read the frame number from a base64 photo or `data:` URI.
    async fn recognise(
        &self,
        caller: &UserId,
        image_base64: &str,
    ) -> Result<FrameNumberReading, Error>;
}
