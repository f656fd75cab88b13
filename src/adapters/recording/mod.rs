//! Recording adapters that capture interactions to cassettes while
//! delegating to a real implementation.

pub mod llm;
pub mod source_host;

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::cassette::recorder::CassetteRecorder;

pub use llm::RecordingLlmClient;
pub use source_host::RecordingSourceHost;

/// Record a call whose result follows the `{"Ok": v}` / `{"Err": e}` convention.
///
/// `err` turns the error side into JSON, so typed errors can be replayed
/// faithfully and opaque ones fall back to their message.
pub(crate) fn record_result<T, E, I>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
    err: impl FnOnce(&E) -> serde_json::Value,
) where
    T: Serialize,
    I: Serialize,
{
    let input_json = serde_json::to_value(input).unwrap_or(serde_json::Value::Null);
    let output_json = match result {
        Ok(v) => match serde_json::to_value(v) {
            Ok(inner) => serde_json::json!({ "Ok": inner }),
            Err(e) => serde_json::json!({ "Err": format!("unrecordable value: {e}") }),
        },
        Err(e) => serde_json::json!({ "Err": err(e) }),
    };

    let mut guard = recorder.lock().expect("recorder lock poisoned");
    guard.record(port, method, input_json, output_json);
}
