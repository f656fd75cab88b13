//! Cassette data structures for recording and replaying port interactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded call on an external port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Sequence number (assigned automatically by the recorder).
    pub seq: u64,
    /// Port name (`"host"` or `"llm"`).
    pub port: String,
    /// Method name invoked on the port.
    pub method: String,
    /// Arguments sent to the port.
    pub input: serde_json::Value,
    /// Value returned from the port, using the `{"Ok": ..}` / `{"Err": ..}` convention.
    pub output: serde_json::Value,
}

/// A named, ordered list of interactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name for this cassette.
    pub name: String,
    /// When this cassette was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Interactions in call order.
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Loads a cassette from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &std::path::Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn load_reads_yaml_written_by_serde() {
        let dir = std::env::temp_dir().join("repocard_cassette_format_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("host.cassette.yaml");

        let cassette = Cassette {
            name: "format-test".into(),
            recorded_at: Utc::now(),
            interactions: vec![Interaction {
                seq: 0,
                port: "host".into(),
                method: "languages".into(),
                input: json!({"repo": "octo/demo"}),
                output: json!({"Ok": [["Rust", 1200]]}),
            }],
        };
        std::fs::write(&path, serde_yaml::to_string(&cassette).unwrap()).unwrap();

        assert_eq!(Cassette::load(&path).unwrap(), cassette);
        assert!(Cassette::load(&dir.join("missing.yaml")).unwrap_err().contains("Failed to read"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
