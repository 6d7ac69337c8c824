use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use async_trait::async_trait;
use audit_config::engines::EngineCommandConfig;
use query_plan_audit::{
    Composer, CompositionError, FederationVersion, PlanningError, QueryPlanner,
    SubgraphDefinition, Supergraph,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tokio::{io::AsyncWriteExt, process::Command};
use tracing::{debug, instrument};

/// Composition and query planning delegated to an external program.
///
/// The program is started once per call with `compose` or `plan` appended to
/// its arguments. It reads one JSON request from stdin and writes one JSON
/// response to stdout.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    version: FederationVersion,
    command: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineCallError {
    #[error("failed to encode the request: {0}")]
    Request(serde_json::Error),
    #[error("failed to start \"{command}\": {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("failed to talk to \"{command}\": {source}")]
    Io {
        command: String,
        source: std::io::Error,
    },
    #[error("\"{command}\" exited with {status}: {stderr}")]
    Exited {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("\"{command}\" returned an invalid response: {source}")]
    InvalidResponse {
        command: String,
        source: serde_json::Error,
    },
}

#[derive(Serialize)]
struct ComposeRequest<'a> {
    subgraphs: &'a [SubgraphDefinition],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComposeResponse {
    #[serde(default)]
    supergraph_sdl: Option<String>,
    #[serde(default)]
    errors: Option<Vec<EngineMessage>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanRequest<'a> {
    supergraph_sdl: &'a str,
    operation: &'a str,
    operation_name: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlanResponse {
    #[serde(default)]
    query_plan: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<EngineMessage>>,
}

#[derive(Deserialize)]
struct EngineMessage {
    message: String,
}

fn messages(errors: Option<Vec<EngineMessage>>) -> Vec<String> {
    errors
        .unwrap_or_default()
        .into_iter()
        .map(|error| error.message)
        .collect()
}

impl CommandEngine {
    pub fn new(
        version: FederationVersion,
        config: &EngineCommandConfig,
        working_dir: impl AsRef<Path>,
    ) -> Self {
        CommandEngine {
            version,
            command: config.command.clone(),
            args: config.args.clone(),
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }

    async fn call<Req, Res>(&self, action: &str, request: &Req) -> Result<Res, EngineCallError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let body = serde_json::to_vec(request).map_err(EngineCallError::Request)?;

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .arg(action)
            .current_dir(&self.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineCallError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        let write = async move {
            match stdin {
                Some(mut stdin) => stdin.write_all(&body).await,
                None => Ok(()),
            }
        };

        let (written, output) = tokio::join!(write, child.wait_with_output());
        let io_error = |source| EngineCallError::Io {
            command: self.command.clone(),
            source,
        };
        let output = output.map_err(io_error)?;

        if !output.status.success() {
            return Err(EngineCallError::Exited {
                command: self.command.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        // A program may answer without reading its whole input.
        if let Err(err) = written {
            debug!(error = %err, "engine closed stdin early");
        }

        serde_json::from_slice(&output.stdout).map_err(|source| EngineCallError::InvalidResponse {
            command: self.command.clone(),
            source,
        })
    }
}

#[async_trait]
impl Composer for CommandEngine {
    fn version(&self) -> FederationVersion {
        self.version
    }

    #[instrument(skip_all, fields(version = %self.version, subgraphs = subgraphs.len()))]
    async fn compose(
        &self,
        subgraphs: &[SubgraphDefinition],
    ) -> Result<Supergraph, CompositionError> {
        let response: ComposeResponse = self
            .call("compose", &ComposeRequest { subgraphs })
            .await
            .map_err(|err| CompositionError::Unavailable {
                version: self.version,
                reason: err.to_string(),
            })?;

        let errors = messages(response.errors);
        match (response.supergraph_sdl, errors.is_empty()) {
            (Some(sdl), true) => Supergraph::new(self.version, sdl),
            (None, true) => Err(CompositionError::Failed {
                version: self.version,
                errors: vec!["Composition returned no supergraph".to_string()],
            }),
            (_, false) => Err(CompositionError::Failed {
                version: self.version,
                errors,
            }),
        }
    }
}

#[async_trait]
impl QueryPlanner for CommandEngine {
    async fn plan(
        &self,
        supergraph: &Supergraph,
        document: &str,
        operation_name: Option<&str>,
    ) -> Result<Value, PlanningError> {
        let request = PlanRequest {
            supergraph_sdl: supergraph.sdl(),
            operation: document,
            operation_name,
        };
        let response: PlanResponse = self
            .call("plan", &request)
            .await
            .map_err(|err| PlanningError::new(err.to_string()))?;

        let errors = messages(response.errors);
        if !errors.is_empty() {
            return Err(PlanningError::new(errors.join("\n")));
        }

        Ok(response.query_plan.unwrap_or(Value::Null))
    }
}
