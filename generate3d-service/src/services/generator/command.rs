//! Generator backed by an external program.
//!
//! The program is invoked once per request with the parameter bundle as
//! command line flags, e.g.
//! `python3 demo.py --prompt "a red chair" --output_path /tmp/model_<id>.glb
//! --seed 7 --resolution 256 --guidance_scale 7.5 --num_inference_steps 50`.

use super::{GenerationError, ModelGenerator};
use crate::models::GenerationParams;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Builds a generator from a whitespace separated command line.
    pub fn from_command_line(command: &str) -> Result<Self, GenerationError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| {
            GenerationError::NotConfigured("generator command is empty".to_string())
        })?;
        Ok(Self::new(program, parts.collect()))
    }

    fn arguments(&self, params: &GenerationParams) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        let flags: [(&str, OsString); 6] = [
            ("--prompt", params.prompt.clone().into()),
            ("--output_path", params.output_path.clone().into_os_string()),
            ("--seed", params.seed.to_string().into()),
            ("--resolution", params.resolution.to_string().into()),
            ("--guidance_scale", params.guidance_scale.to_string().into()),
            (
                "--num_inference_steps",
                params.num_inference_steps.to_string().into(),
            ),
        ];
        for (flag, value) in flags {
            args.push(flag.into());
            args.push(value);
        }
        args
    }
}

/// Last non-empty stderr line, which is where interpreters put the error.
fn failure_message(stderr: &[u8]) -> Option<String> {
    String::from_utf8_lossy(stderr)
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl ModelGenerator for CommandGenerator {
    async fn generate(&self, params: &GenerationParams) -> Result<PathBuf, GenerationError> {
        tracing::debug!(
            program = %self.program,
            output_path = %params.output_path.display(),
            "Spawning generator process"
        );

        let output = Command::new(&self.program)
            .args(self.arguments(params))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| GenerationError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            tracing::debug!(program = %self.program, "{}", line);
        }

        if !output.status.success() {
            let message = failure_message(&output.stderr)
                .unwrap_or_else(|| format!("generator exited with {}", output.status));
            tracing::error!(
                program = %self.program,
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr),
                "Generator process failed"
            );
            return Err(GenerationError::Failed(message));
        }

        Ok(params.output_path.clone())
    }

    async fn health_check(&self) -> Result<(), GenerationError> {
        let program = Path::new(&self.program);
        if program.components().count() > 1 && !program.exists() {
            return Err(GenerationError::NotConfigured(format!(
                "generator program {} does not exist",
                self.program
            )));
        }
        Ok(())
    }
}
