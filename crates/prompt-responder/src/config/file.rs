//! Answer file loading.
//!
//! Answer files are flat tables of scalars. Non-string scalars are stored in
//! their textual form, so `exposeModel = true` becomes the answer `"true"`.

use std::path::Path;

use crate::answers::Answers;
use crate::error::{ResponderError, Result};

/// Answer file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Detect format from path.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Load answers from a `.toml` or `.json` file.
pub fn load_answers(path: impl AsRef<Path>) -> Result<Answers> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path).ok_or_else(|| {
        ResponderError::config(format!("unknown answer file format: {}", path.display()))
    })?;
    let content = std::fs::read_to_string(path).map_err(|e| {
        ResponderError::io_context(format!("reading answer file {}", path.display()), e)
    })?;

    tracing::debug!(path = %path.display(), ?format, "Loading answer file");
    parse_answers(&content, format)
}

/// Parse answers from file content.
pub fn parse_answers(content: &str, format: ConfigFormat) -> Result<Answers> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

fn parse_toml(content: &str) -> Result<Answers> {
    let table: toml::Table = content
        .parse()
        .map_err(|e: toml::de::Error| ResponderError::config(format!("invalid TOML: {e}")))?;

    let mut answers = Answers::new();
    for (key, value) in table {
        let text = match value {
            toml::Value::String(s) => s,
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            toml::Value::Datetime(d) => d.to_string(),
            toml::Value::Array(_) | toml::Value::Table(_) => {
                return Err(ResponderError::config(format!(
                    "answer {key:?} must be a scalar value"
                )));
            }
        };
        answers.insert(key, text);
    }
    Ok(answers)
}

fn parse_json(content: &str) -> Result<Answers> {
    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)
        .map_err(|e| ResponderError::config(format!("invalid JSON answer object: {e}")))?;

    let mut answers = Answers::new();
    for (key, value) in map {
        let text = match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                return Err(ResponderError::config(format!(
                    "answer {key:?} must be a scalar value"
                )));
            }
        };
        answers.insert(key, text);
    }
    Ok(answers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_toml_answers() {
        let content = r#"
            modelName = "a-model"
            exposeModel = true
            modelPlural = ""
            retries = 3
        "#;

        let answers = parse_answers(content, ConfigFormat::Toml).unwrap();
        assert_eq!(answers.get("modelName"), Some("a-model"));
        assert_eq!(answers.get("exposeModel"), Some("true"));
        assert_eq!(answers.get("modelPlural"), Some(""));
        assert_eq!(answers.get("retries"), Some("3"));
    }

    #[test]
    fn parse_json_answers() {
        let content = r#"{"appName": "test-app", "appDir": ".", "skip": null}"#;

        let answers = parse_answers(content, ConfigFormat::Json).unwrap();
        assert_eq!(answers.get("appName"), Some("test-app"));
        assert_eq!(answers.get("appDir"), Some("."));
        assert_eq!(answers.get("skip"), Some(""));
    }

    #[test]
    fn nested_values_are_rejected() {
        let content = r#"{"selectedModels": {"pets": 2}}"#;
        let err = parse_answers(content, ConfigFormat::Json).unwrap_err();
        assert!(err.to_string().contains("selectedModels"));

        let err = parse_answers("[section]\nkey = 1", ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, ResponderError::Config { .. }));
    }

    #[test]
    fn config_format_detection() {
        assert_eq!(ConfigFormat::from_extension("TOML"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
        assert_eq!(
            ConfigFormat::from_path(Path::new("answers/model.json")),
            Some(ConfigFormat::Json)
        );
    }

    #[test]
    fn load_answers_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.toml");
        std::fs::write(&path, "appName = \"test-app\"\nappDir = \".\"\n").unwrap();

        let answers = load_answers(&path).unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers.get("appDir"), Some("."));

        let err = load_answers(dir.path().join("answers.ini")).unwrap_err();
        assert!(matches!(err, ResponderError::Config { .. }));
    }
}
