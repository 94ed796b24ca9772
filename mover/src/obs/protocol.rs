/// The slice of the OBS WebSocket v5 protocol the mover speaks: the
/// Hello/Identify/Identified handshake and recording output events.
use base64::engine::general_purpose::STANDARD as Base64Engine;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tracing::warn;

use crate::event::RecordingEvent;

pub const OP_HELLO: u8 = 0;
pub const OP_IDENTIFY: u8 = 1;
pub const OP_IDENTIFIED: u8 = 2;
pub const OP_EVENT: u8 = 5;

pub const RPC_VERSION: u32 = 1;
/// `EventSubscription::Outputs`: record, stream and replay-buffer events.
pub const EVENT_SUBSCRIPTION_OUTPUTS: u32 = 1 << 6;
/// WebSocket close code OBS sends when the password is wrong.
pub const CLOSE_AUTHENTICATION_FAILED: u16 = 4009;

pub const STATE_STARTED: &str = "OBS_WEBSOCKET_OUTPUT_STARTED";
pub const STATE_STOPPED: &str = "OBS_WEBSOCKET_OUTPUT_STOPPED";

/// Every OBS message: an opcode plus opcode-specific data.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hello {
    #[serde(default)]
    pub obs_web_socket_version: Option<String>,
    pub rpc_version: u32,
    #[serde(default)]
    pub authentication: Option<AuthChallenge>,
}

#[derive(Debug, Deserialize)]
pub struct AuthChallenge {
    pub challenge: String,
    pub salt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Identify<'a> {
    rpc_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    authentication: Option<&'a str>,
    event_subscriptions: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub event_type: String,
    #[serde(default)]
    pub event_data: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordStateChanged {
    output_state: String,
    #[serde(default)]
    output_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordFileChanged {
    new_output_path: String,
}

/// `base64(sha256(base64(sha256(password + salt)) + challenge))`
pub fn auth_response(password: &str, challenge: &AuthChallenge) -> String {
    let mut sha = Sha256::new();
    sha.update(password.as_bytes());
    sha.update(challenge.salt.as_bytes());
    let secret = Base64Engine.encode(sha.finalize_reset());
    sha.update(secret.as_bytes());
    sha.update(challenge.challenge.as_bytes());
    Base64Engine.encode(sha.finalize())
}

/// The Identify message, subscribed to output events only.
pub fn identify_message(authentication: Option<&str>) -> String {
    let identify = Identify {
        rpc_version: RPC_VERSION,
        authentication,
        event_subscriptions: EVENT_SUBSCRIPTION_OUTPUTS,
    };
    json!({ "op": OP_IDENTIFY, "d": identify }).to_string()
}

/// Maps an OBS event to a recording event. Events the mover does not act on
/// (pause/resume, starting/stopping transitions, streaming) map to `None`.
pub fn decode_event(event: &EventPayload) -> Option<RecordingEvent> {
    match event.event_type.as_str() {
        "RecordStateChanged" => {
            let data: RecordStateChanged = match serde_json::from_value(event.event_data.clone()) {
                Ok(data) => data,
                Err(e) => {
                    warn!(error = %e, "Malformed RecordStateChanged event");
                    return None;
                }
            };
            match data.output_state.as_str() {
                STATE_STARTED => Some(RecordingEvent::Started(
                    data.output_path.filter(|p| !p.is_empty()).map(PathBuf::from),
                )),
                STATE_STOPPED => match data.output_path.filter(|p| !p.is_empty()) {
                    Some(path) => Some(RecordingEvent::Stopped(PathBuf::from(path))),
                    None => {
                        warn!("Recording stopped but OBS reported no output path");
                        None
                    }
                },
                _ => None,
            }
        }
        "RecordFileChanged" => {
            match serde_json::from_value::<RecordFileChanged>(event.event_data.clone()) {
                Ok(data) if !data.new_output_path.is_empty() => Some(RecordingEvent::FileChanged(
                    PathBuf::from(data.new_output_path),
                )),
                Ok(_) => None,
                Err(e) => {
                    warn!(error = %e, "Malformed RecordFileChanged event");
                    None
                }
            }
        }
        _ => None,
    }
}
