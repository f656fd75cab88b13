//! Replaying adapters that serve recorded interactions instead of calling out.

pub mod llm;
pub mod source_host;

use std::sync::{Arc, Mutex};

use crate::cassette::replayer::CassetteReplayer;

pub use llm::ReplayingLlmClient;
pub use source_host::ReplayingSourceHost;

/// Pops the next recorded output for `port::method`.
///
/// # Panics
///
/// Panics if no cassette is configured for the port or the stream is exhausted.
pub(crate) fn next_output(
    replayer: Option<&Arc<Mutex<CassetteReplayer>>>,
    port: &str,
    method: &str,
) -> serde_json::Value {
    let Some(replayer) = replayer else {
        panic!("{port} port not configured for replay: no cassette loaded for {port}::{method}");
    };
    let mut guard = replayer.lock().expect("replayer lock poisoned");
    guard.next_interaction(port, method).output
}

/// Splits a recorded output into its `Ok` or `Err` payload.
///
/// Outputs without either key are treated as a bare `Ok` value.
pub(crate) fn split_result(output: serde_json::Value) -> Result<serde_json::Value, serde_json::Value> {
    match output {
        serde_json::Value::Object(mut map) => {
            if let Some(err) = map.remove("Err") {
                Err(err)
            } else if let Some(ok) = map.remove("Ok") {
                Ok(ok)
            } else {
                Ok(serde_json::Value::Object(map))
            }
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_result_conventions() {
        assert_eq!(split_result(json!({"Ok": [1]})), Ok(json!([1])));
        assert_eq!(split_result(json!({"Err": "boom"})), Err(json!("boom")));
        assert_eq!(split_result(json!({"text": "x"})), Ok(json!({"text": "x"})));
        assert_eq!(split_result(json!(true)), Ok(json!(true)));
    }

    #[test]
    #[should_panic(expected = "not configured for replay")]
    fn unconfigured_port_panics() {
        let _ = next_output(None, "llm", "complete");
    }
}
