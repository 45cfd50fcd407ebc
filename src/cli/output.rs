use crate::cli::error::{BootstrapError, BootstrapErrorKind};
use serde::Serialize;
use std::error::Error;


#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapErrorType {
    Engine,
    Logging,
    Parse,
    Upgrade,
}

#[derive(Debug, Serialize)]
pub struct BootstrapErrorJson {
    #[serde(rename = "type")]
    pub kind: BootstrapErrorType,
    pub message: String,
    pub causes: Vec<String>,
}

impl From<&BootstrapError> for BootstrapErrorJson {
    fn from(e: &BootstrapError) -> Self {
        let (kind, message) = match &e.kind {
            BootstrapErrorKind::Engine(inner) => (BootstrapErrorType::Engine, inner.to_string()),
            BootstrapErrorKind::Parse(inner) => (BootstrapErrorType::Parse, inner.to_string()),
            BootstrapErrorKind::SetGlobalDefault(inner) => (BootstrapErrorType::Logging, inner.to_string()),
            BootstrapErrorKind::Upgrade(inner) => (BootstrapErrorType::Upgrade, inner.to_string()),
        };

        // Wrapper layers repeat their inner message; keep only what adds to it.
        let mut causes: Vec<String> = Vec::new();
        let mut source = e.kind.source().and_then(Error::source);
        while let Some(error) = source {
            let text = error.to_string();
            let last = causes.last().unwrap_or(&message);
            if !last.contains(&text) {
                causes.push(text);
            }
            source = error.source();
        }

        BootstrapErrorJson { kind, message, causes }
    }
}


#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapStatus {
    Success,
    Error,
}

#[derive(Debug, Serialize)]
pub struct BootstrapOutput<T: Serialize> {
    pub command: String,
    pub status: BootstrapStatus,
    pub data: Option<T>,
    pub error: Option<BootstrapErrorJson>,
}

impl<T: Serialize> BootstrapOutput<T> {
    pub fn new(command: String, result: Result<T, BootstrapError>) -> Self {
        match result {
            Ok(data) => BootstrapOutput {
                command,
                status: BootstrapStatus::Success,
                data: Some(data),
                error: None,
            },
            Err(e) => BootstrapOutput {
                command,
                status: BootstrapStatus::Error,
                data: None,
                error: Some(BootstrapErrorJson::from(&e)),
            },
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::{UpgradeError, UpgradeErrorKind};
    use anyhow::Context;
    use semver::Version;

    fn step_failure() -> BootstrapError {
        let source = Err::<(), _>(anyhow::anyhow!("Table 'task' already exists"))
            .context("failed to upgrade to v6.3.0")
            .unwrap_err();
        UpgradeError {
            kind: UpgradeErrorKind::Step { version: Version::new(6, 3, 0), source },
        }.into()
    }

    #[test]
    fn serializes_error_to_expected_json() {
        let output: BootstrapOutput<()> = BootstrapOutput::new("upgrade".into(), Err(step_failure()));
        let s = serde_json::to_string(&output).unwrap();
        assert_eq!(
            s,
            r#"{"command":"upgrade","status":"error","data":null,"error":{"type":"upgrade","message":"failed to upgrade to v6.3.0","causes":["Table 'task' already exists"]}}"#
        );
    }

    #[test]
    fn serializes_success_with_data() {
        let output = BootstrapOutput::new(
            "plan".into(),
            Ok(serde_json::json!({ "steps": ["6.2.1"] })),
        );
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["data"]["steps"][0], "6.2.1");
        assert!(value["error"].is_null());
    }
}
