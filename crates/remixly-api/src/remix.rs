// Remix endpoint

use tracing::debug;

use crate::client::{RemixClient, decode};
use crate::error::Error;
use crate::models::{RemixBody, RemixEnvelope, RemixOutput};

impl RemixClient {
    /// Run a remix of `content` in the given style (feature kind).
    ///
    /// The backend sometimes answers HTTP 200 with an `error` and no
    /// `output`; that is treated as a rejection and classified the same way
    /// as a non-success status.
    pub async fn remix(
        &self,
        content: &str,
        style: &str,
        is_guest: bool,
    ) -> Result<RemixOutput, Error> {
        let url = self.endpoint("remix")?;
        debug!(style, is_guest, chars = content.len(), "POST {}", url);

        let body = RemixBody {
            content,
            style,
            is_guest,
        };

        let resp = self.http().post(url).json(&body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(Self::rejection(status, &text));
        }

        let envelope: RemixEnvelope = decode(&text)?;
        match envelope.output {
            Some(output) if !output.is_empty() => Ok(RemixOutput {
                output,
                uses_left: envelope.uses_left,
            }),
            _ => Err(Error::from_rejection(
                status.as_u16(),
                Some(
                    envelope
                        .error
                        .unwrap_or_else(|| "backend returned no output".into()),
                ),
                envelope.requires_premium,
            )),
        }
    }
}
