//! Recorded pointer input.

use scribble_core::PointerEvent;
use thiserror::Error;

/// Script loading errors.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Invalid script JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A sequence of pointer events to replay, in dispatch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerScript {
    pub events: Vec<PointerEvent>,
}

impl PointerScript {
    pub fn new(events: Vec<PointerEvent>) -> Self {
        Self { events }
    }

    /// Parse a JSON array such as `[{"type": "down", "x": 1, "y": 2}]`.
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        let events: Vec<PointerEvent> = serde_json::from_str(json)?;
        Ok(Self { events })
    }

    pub fn to_json(&self) -> Result<String, ScriptError> {
        Ok(serde_json::to_string(&self.events)?)
    }

    /// Read a script file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ScriptError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script = PointerScript::from_json(
            r#"[{"type":"down","x":10,"y":10},{"type":"move","x":20.5,"y":10},{"type":"up","x":20,"y":10}]"#,
        )
        .unwrap();

        assert_eq!(script.len(), 3);
        assert_eq!(script.events[0], PointerEvent::Down { x: 10.0, y: 10.0 });
        assert_eq!(script.events[1], PointerEvent::Move { x: 20.5, y: 10.0 });
        assert_eq!(script.events[2], PointerEvent::Up { x: 20.0, y: 10.0 });
    }

    #[test]
    fn test_to_json_reparses() {
        let script = PointerScript::new(vec![PointerEvent::Move { x: 1.0, y: 2.0 }]);
        let json = script.to_json().unwrap();
        assert_eq!(PointerScript::from_json(&json).unwrap(), script);
    }

    #[test]
    fn test_unknown_event_type_rejected() {
        let err = PointerScript::from_json(r#"[{"type":"wheel","x":0,"y":0}]"#).unwrap_err();
        assert!(matches!(err, ScriptError::Json(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = PointerScript::load("/nonexistent/script.json").unwrap_err();
        assert!(matches!(err, ScriptError::Io(_)));
    }
}
