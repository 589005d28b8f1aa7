//! Backend that drives the model library through an external bridge program.
//!
//! Protocol:
//! - `<program> run` reads a configuration document on stdin.
//! - `<program> read <blob>` deserializes a saved result.
//!
//! Either way the bridge prints one JSON object on stdout, holding
//! `result` (plus `aperture` for `run`) on success or
//! `error: { kind, message }` naming the Python exception class on failure.

use serde::Deserialize;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use vm_config::RunConfiguration;
use vm_results::{ApertureRecovery, VectorialResult};

use crate::backend::{BackendError, VectorialBackend};

/// Environment variable naming the bridge program.
pub const BACKEND_ENV: &str = "VM_BACKEND";

#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: PathBuf,
    args: Vec<OsString>,
}

/// A finished run as reported by the bridge.
#[derive(Debug, Clone)]
pub struct BridgeComa {
    pub result: VectorialResult,
    pub aperture: Option<ApertureRecovery>,
}

#[derive(Debug, Deserialize)]
struct BridgeReply {
    #[serde(default)]
    result: Option<VectorialResult>,
    #[serde(default)]
    aperture: Option<ApertureRecovery>,
    #[serde(default)]
    error: Option<BridgeException>,
}

#[derive(Debug, Deserialize)]
struct BridgeException {
    kind: String,
    #[serde(default)]
    message: String,
}

impl CommandBackend {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn from_env() -> Option<Self> {
        std::env::var_os(BACKEND_ENV).map(Self::new)
    }

    /// Extra leading argument, e.g. a script path when the program is an
    /// interpreter.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn invoke(&self, args: &[OsString], stdin: Option<&[u8]>) -> Result<BridgeComa, BackendError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                BackendError::Fault(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(input)
                .map_err(|e| BackendError::Fault(format!("failed to write to bridge: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| BackendError::Fault(format!("bridge did not finish: {}", e)))?;

        tracing::debug!(
            program = %self.program.display(),
            status = %output.status,
            "bridge returned"
        );

        parse_reply(&output.stdout).map_err(|err| match err {
            BackendError::Fault(message) if !output.status.success() => BackendError::Fault(format!(
                "{} (exit {}): {}",
                message,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )),
            other => other,
        })
    }
}

fn parse_reply(stdout: &[u8]) -> Result<BridgeComa, BackendError> {
    let reply: BridgeReply = serde_json::from_slice(stdout)
        .map_err(|e| BackendError::Fault(format!("malformed bridge reply: {}", e)))?;

    if let Some(exception) = reply.error {
        return Err(BackendError::from_exception(
            &exception.kind,
            exception.message,
        ));
    }

    let result = reply
        .result
        .ok_or_else(|| BackendError::Fault("bridge reply carried no result".to_string()))?;
    result
        .check_shapes()
        .map_err(|e| BackendError::Fault(e.to_string()))?;

    Ok(BridgeComa {
        result,
        aperture: reply.aperture,
    })
}

impl VectorialBackend for CommandBackend {
    type Coma = BridgeComa;

    fn run_model(&mut self, config: &RunConfiguration) -> Result<BridgeComa, BackendError> {
        let document = serde_yaml::to_string(config)
            .map_err(|e| BackendError::InvalidValue(e.to_string()))?;
        self.invoke(&[OsString::from("run")], Some(document.as_bytes()))
    }

    fn result_from_coma(&self, coma: &BridgeComa) -> Result<VectorialResult, BackendError> {
        Ok(coma.result.clone())
    }

    fn aperture_recovery(&self, coma: &BridgeComa) -> Result<ApertureRecovery, BackendError> {
        coma.aperture
            .ok_or_else(|| BackendError::Fault("bridge reply carried no aperture data".to_string()))
    }

    fn read_results(&mut self, blob: &Path) -> Result<VectorialResult, BackendError> {
        let args = [OsString::from("read"), blob.as_os_str().to_os_string()];
        self.invoke(&args, None).map(|coma| coma.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK_REPLY: &str = r#"{
        "result": {
            "volume_density_grid_km": [1.0],
            "volume_density_per_cm3": [2.0],
            "column_density_grid_km": [],
            "column_density_per_cm2": [],
            "num_fragments_theory": 10.0,
            "num_fragments_grid": 9.5,
            "max_grid_radius_m": 1.0e9
        },
        "aperture": {
            "fragments_theory": 10.0,
            "circular_total": 9.9,
            "annular_total": 0.4
        }
    }"#;

    #[test]
    fn successful_reply() {
        let coma = parse_reply(OK_REPLY.as_bytes()).unwrap();
        assert_eq!(coma.result.num_fragments_grid, 9.5);
        assert_eq!(coma.aperture.unwrap().annular_total, 0.4);
    }

    #[test]
    fn exception_reply_is_classified() {
        let reply = br#"{"error": {"kind": "ZeroDivisionError", "message": "float division by zero"}}"#;
        assert_eq!(
            parse_reply(reply).unwrap_err(),
            BackendError::ZeroDivision("float division by zero".to_string())
        );

        let reply = br#"{"error": {"kind": "UnpicklingError"}}"#;
        assert!(matches!(
            parse_reply(reply).unwrap_err(),
            BackendError::Unreadable(_)
        ));
    }

    #[test]
    fn garbage_is_a_fault() {
        let err = parse_reply(b"Traceback (most recent call last):").unwrap_err();
        assert!(matches!(err, BackendError::Fault(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn missing_program_is_a_fault() {
        let mut backend = CommandBackend::new("/nonexistent/vm-bridge-for-tests");
        let err = backend
            .read_results(Path::new("coma.pickle"))
            .unwrap_err();
        assert!(matches!(err, BackendError::Fault(message) if message.contains("failed to start")));
    }
}
