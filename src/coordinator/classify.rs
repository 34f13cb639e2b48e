//! Classification of raw run stream events.

use serde::Deserialize;

use crate::error::{BridgeError, Result};
use crate::types::{event_names, RunStreamEvent, ToolCallRequest};

/// Step kind that precedes the assistant writing its message.
pub const MESSAGE_CREATION_STEP: &str = "message_creation";

/// What one run event means to the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum RunSignal {
    RunCreated { run_id: String },
    TextDelta { text: String },
    /// Final message content; `None` when the event carried no text parts.
    MessageCompleted { text: Option<String> },
    MessageCreationStep,
    RequiresAction {
        run_id: String,
        calls: Vec<ToolCallRequest>,
    },
    RunCompleted,
    RunFailed { message: Option<String> },
    Ignored,
}

#[derive(Deserialize)]
struct RunData {
    id: String,
    #[serde(default)]
    required_action: Option<RequiredAction>,
    #[serde(default)]
    last_error: Option<ErrorData>,
}

#[derive(Deserialize)]
struct RequiredAction {
    submit_tool_outputs: SubmitToolOutputs,
}

#[derive(Deserialize)]
struct SubmitToolOutputs {
    tool_calls: Vec<RawToolCall>,
}

#[derive(Deserialize)]
struct RawToolCall {
    id: String,
    function: FunctionCall,
}

#[derive(Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct ErrorData {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct MessageDeltaData {
    delta: MessageBody,
}

#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<TextValue>,
}

#[derive(Deserialize)]
struct TextValue {
    #[serde(default)]
    value: String,
}

#[derive(Deserialize)]
struct StepData {
    step_details: StepDetails,
}

#[derive(Deserialize)]
struct StepDetails {
    #[serde(rename = "type")]
    kind: String,
}

fn decode<T: serde::de::DeserializeOwned>(event: &RunStreamEvent) -> Result<T> {
    serde_json::from_value(event.data.clone()).map_err(|e| {
        BridgeError::Stream(format!("malformed `{}` event: {e}", event.event))
    })
}

fn text_of(blocks: Vec<ContentBlock>) -> Option<String> {
    let parts: Vec<String> = blocks
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text.map(|t| t.value))
        .collect();
    (!parts.is_empty()).then(|| parts.concat())
}

/// Classify one event and extract the fields the coordinator needs.
///
/// Unknown events are [`RunSignal::Ignored`]; a known event whose payload
/// does not decode is a stream error.
pub fn classify(event: &RunStreamEvent) -> Result<RunSignal> {
    let signal = match event.event.as_str() {
        event_names::RUN_CREATED => {
            let run: RunData = decode(event)?;
            RunSignal::RunCreated { run_id: run.id }
        }
        event_names::MESSAGE_DELTA => {
            let delta: MessageDeltaData = decode(event)?;
            RunSignal::TextDelta {
                text: text_of(delta.delta.content).unwrap_or_default(),
            }
        }
        event_names::MESSAGE_COMPLETED => {
            let message: MessageBody = decode(event)?;
            RunSignal::MessageCompleted {
                text: text_of(message.content),
            }
        }
        event_names::RUN_STEP_CREATED => {
            let step: StepData = decode(event)?;
            if step.step_details.kind == MESSAGE_CREATION_STEP {
                RunSignal::MessageCreationStep
            } else {
                RunSignal::Ignored
            }
        }
        event_names::RUN_REQUIRES_ACTION => {
            let run: RunData = decode(event)?;
            let action = run.required_action.ok_or_else(|| {
                BridgeError::Stream("requires_action event without required_action".to_string())
            })?;
            let calls = action
                .submit_tool_outputs
                .tool_calls
                .into_iter()
                .map(|call| ToolCallRequest {
                    id: call.id,
                    name: call.function.name,
                    arguments: call.function.arguments,
                })
                .collect();
            RunSignal::RequiresAction {
                run_id: run.id,
                calls,
            }
        }
        event_names::RUN_COMPLETED => RunSignal::RunCompleted,
        event_names::RUN_FAILED => {
            let message = decode::<RunData>(event)
                .ok()
                .and_then(|run| run.last_error)
                .and_then(|error| error.message);
            RunSignal::RunFailed { message }
        }
        event_names::ERROR => RunSignal::RunFailed {
            message: event
                .data
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string),
        },
        _ => RunSignal::Ignored,
    };
    Ok(signal)
}
