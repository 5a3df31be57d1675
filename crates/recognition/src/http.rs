use std::time::{Duration, Instant};

use reqwest::blocking::{multipart, Client};
use shared::{domain::Recognition, error::EngineError};
use tracing::debug;

use crate::{elapsed_ms, parse_engine_output, ImageKind, RecognitionEngine};

/// Posts the image to a recognition service as multipart field `file`.
pub struct HttpEngine {
    url: String,
    client: Client,
}

impl HttpEngine {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| EngineError::Http(err.to_string()))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

impl RecognitionEngine for HttpEngine {
    fn name(&self) -> &str {
        &self.url
    }

    fn recognize(&self, image: &[u8]) -> Result<Recognition, EngineError> {
        let started = Instant::now();
        let kind = ImageKind::sniff(image);
        let part = multipart::Part::bytes(image.to_vec())
            .file_name(format!("image.{}", kind.extension()))
            .mime_str(kind.mime())
            .map_err(|err| EngineError::Http(err.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        debug!(url = %self.url, bytes = image.len(), "posting image to recognition service");
        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .map_err(|err| EngineError::Http(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| EngineError::Http(err.to_string()))?;
        if !status.is_success() {
            return Err(EngineError::Failed {
                status: status.to_string(),
                stderr: body.trim().to_string(),
            });
        }

        let (latex, metadata) = parse_engine_output(&body)?;
        Ok(Recognition {
            latex,
            elapsed_ms: elapsed_ms(started),
            metadata,
        })
    }
}
