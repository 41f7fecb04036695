//! Frame number recognition for the intake form.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountRepository, FrameNumberReader, FrameNumberReaderError, FrameNumberRecognition,
};
use crate::domain::service_support::load_actor;
use crate::domain::{Error, FrameNumberReading, OcrImage, UserId};

/// Service implementing [`FrameNumberRecognition`].
pub struct FrameNumberService<V, A> {
    reader: Arc<V>,
    accounts: Arc<A>,
}

impl<V, A> FrameNumberService<V, A> {
    pub fn new(reader: Arc<V>, accounts: Arc<A>) -> Self {
        Self { reader, accounts }
    }
}

fn map_reader_error(error: FrameNumberReaderError) -> Error {
    warn!(%error, "frame number recognition failed");
    Error::service_unavailable(error.to_string())
}

#[async_trait]
impl<V, A> FrameNumberRecognition for FrameNumberService<V, A>
where
    V: FrameNumberReader,
    A: AccountRepository,
{
    async fn recognise(
        &self,
        caller: &UserId,
        image_base64: &str,
    ) -> Result<FrameNumberReading, Error> {
        load_actor(self.accounts.as_ref(), caller).await?;
        let image = OcrImage::from_base64(image_base64)?;
        let raw = self.reader.read(&image).await.map_err(map_reader_error)?;
        let reading = FrameNumberReading::interpret(raw);
        info!(
            %caller,
            found = reading.frame_number.is_some(),
            "frame number recognised"
        );
        Ok(reading)
    }
}
