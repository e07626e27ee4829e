use futures_util::StreamExt;
use serde::Deserialize;
use thiserror::Error;
use translator_core::Framing;
use translator_logging::translator_debug;

use crate::{FragmentStream, RemoteCallError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed frame {frame:?}: {message}")]
    Malformed { frame: String, message: String },
}

#[derive(Deserialize)]
struct Frame {
    #[serde(default)]
    message: Option<String>,
}

/// Incrementally decodes the fragments of one streaming reply.
///
/// In framed mode the decoder buffers input until it holds a `{` followed by a
/// `}`, parses that slice as a JSON object and appends its `message` field.
/// Braces are not matched for nesting: the first `}` after the first `{` ends
/// the candidate, so a message containing literal braces is cut short.
/// Slices that fail to parse are dropped.
#[derive(Debug)]
pub struct FrameDecoder {
    framing: Framing,
    buffer: String,
    text: String,
}

impl FrameDecoder {
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            buffer: String::new(),
            text: String::new(),
        }
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Decoded text so far. Only ever grows.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Input received but not yet consumed by a complete frame.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Feeds one fragment; returns whether the decoded text grew.
    pub fn push(&mut self, fragment: &str) -> bool {
        let mut grew = false;
        self.feed(fragment, |_| grew = true);
        grew
    }

    /// Feeds one fragment, calling `on_update` with the decoded text after every append.
    pub fn feed(&mut self, fragment: &str, mut on_update: impl FnMut(&str)) {
        if fragment.is_empty() {
            return;
        }
        match self.framing {
            Framing::Plain => {
                self.text.push_str(fragment);
                on_update(&self.text);
            }
            Framing::Framed => {
                self.buffer.push_str(fragment);
                self.extract_frames(&mut on_update);
            }
        }
    }

    fn extract_frames(&mut self, on_update: &mut impl FnMut(&str)) {
        loop {
            let Some(start) = self.buffer.find('{') else {
                break;
            };
            let Some(offset) = self.buffer[start..].find('}') else {
                break;
            };
            let end = start + offset;

            match parse_frame(&self.buffer[start..=end]) {
                Ok(Some(message)) => {
                    self.text.push_str(&message);
                    on_update(&self.text);
                }
                Ok(None) => {}
                Err(err) => translator_debug!("Dropping frame: {}", err),
            }
            self.buffer.drain(..=end);
        }
    }
}

fn parse_frame(slice: &str) -> Result<Option<String>, DecodeError> {
    let frame: Frame = serde_json::from_str(slice).map_err(|err| DecodeError::Malformed {
        frame: slice.to_string(),
        message: err.to_string(),
    })?;
    Ok(frame.message.filter(|message| !message.is_empty()))
}

/// Drives a decoder over `stream` until the remote side closes it.
///
/// `on_update` sees the decoded text after every append. A transport error
/// ends the drain; decode errors never do.
pub async fn drain_fragments(
    mut stream: FragmentStream,
    framing: Framing,
    mut on_update: impl FnMut(&str),
) -> Result<String, RemoteCallError> {
    let mut decoder = FrameDecoder::new(framing);
    while let Some(fragment) = stream.next().await {
        decoder.feed(&fragment?, &mut on_update);
    }
    if !decoder.buffered().is_empty() {
        translator_debug!(
            "Stream closed with {} undecoded byte(s)",
            decoder.buffered().len()
        );
    }
    Ok(decoder.into_text())
}
