//! # Command Codec
//!
//! Pure structural transform between typed commands and wire messages.
//!
//! ```text
//! request: {"pattern":{"cmd":"get-user"},"id":"<uuid>","reply_to":"gw.reply.1","data":{"id":4}}
//! reply:   {"id":"<uuid>","response":{...}}   or   {"id":"<uuid>","err":{"kind":...,"message":...}}
//! ```
//!
//! Payloads stay opaque JSON until the handler for the command asks for its
//! own type through [`decode_payload`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{CommandError, CommandName, CorrelationId};
use thiserror::Error;

/// Failures of the codec itself, as opposed to payload shape errors which
/// are reported as [`CommandError`] replies.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The message is not a readable frame. No reply address can be trusted.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The value could not be serialized.
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Message pattern selecting the handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandPattern {
    pub cmd: String,
}

/// A command as it travels on a service queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFrame {
    pub pattern: CommandPattern,
    /// Correlation id; absent for fire-and-forget messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CorrelationId>,
    /// Queue the reply goes to; absent for fire-and-forget messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl RequestFrame {
    /// Resolve the pattern against the command surface.
    pub fn command(&self) -> Result<CommandName, CommandError> {
        self.pattern
            .cmd
            .parse()
            .map_err(|_| CommandError::unknown_command(&self.pattern.cmd))
    }

    /// Where to reply, when the sender asked for one.
    pub fn reply_address(&self) -> Option<(CorrelationId, &str)> {
        match (self.id, self.reply_to.as_deref()) {
            (Some(id), Some(reply_to)) => Some((id, reply_to)),
            _ => None,
        }
    }
}

/// A reply as it travels on a reply queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyFrame {
    pub id: CorrelationId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<CommandError>,
}

impl ReplyFrame {
    /// The outcome the service produced. A reply with neither field is a
    /// success with a `null` body.
    pub fn into_result(self) -> Result<Value, CommandError> {
        match self.err {
            Some(err) => Err(err),
            None => Ok(self.response.unwrap_or(Value::Null)),
        }
    }
}

/// Encode a command addressed to a service queue.
pub fn encode_request<P: Serialize + ?Sized>(
    command: CommandName,
    correlation_id: CorrelationId,
    reply_to: &str,
    payload: &P,
) -> Result<Vec<u8>, CodecError> {
    let data = serde_json::to_value(payload).map_err(|e| CodecError::Encode(e.to_string()))?;
    let frame = RequestFrame {
        pattern: CommandPattern {
            cmd: command.as_str().to_string(),
        },
        id: Some(correlation_id),
        reply_to: Some(reply_to.to_string()),
        data,
    };
    serde_json::to_vec(&frame).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Parse a command frame. Payload shape is not checked here.
pub fn decode_request(bytes: &[u8]) -> Result<RequestFrame, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::MalformedEnvelope(e.to_string()))
}

/// Decode a command's payload into the type its handler expects.
pub fn decode_payload<T: DeserializeOwned>(command: CommandName, data: Value) -> Result<T, CommandError> {
    serde_json::from_value(data)
        .map_err(|e| CommandError::malformed(format!("invalid payload for '{command}': {e}")))
}

/// Encode a service's reply.
pub fn encode_reply(
    correlation_id: CorrelationId,
    outcome: &Result<Value, CommandError>,
) -> Result<Vec<u8>, CodecError> {
    let frame = match outcome {
        Ok(value) => ReplyFrame {
            id: correlation_id,
            response: Some(value.clone()),
            err: None,
        },
        Err(err) => ReplyFrame {
            id: correlation_id,
            response: None,
            err: Some(err.clone()),
        },
    };
    serde_json::to_vec(&frame).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Parse a reply frame.
pub fn decode_reply(bytes: &[u8]) -> Result<ReplyFrame, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::MalformedEnvelope(e.to_string()))
}
