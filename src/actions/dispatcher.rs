// dispatcher.rs
use async_trait::async_trait;
use serde_json::json;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Arc;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use super::ActionDevice;
use crate::{
    error::AppError,
    events::{ACTION_DISPATCHED, ACTION_FAILED, EventBus},
    utils::parse_value,
};

/// Program and single argument for one action run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub arg: String,
}

impl Invocation {
    /// The argument is the caller's value when it parses as an integer and
    /// an empty string otherwise; a bad value never blocks the run.
    pub fn for_action(scripts_dir: &Path, action: &ActionDevice, raw_val: Option<&str>) -> Self {
        Self {
            program: scripts_dir.join(&action.path),
            arg: parse_value(raw_val).map(|v| v.to_string()).unwrap_or_default(),
        }
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.arg(&self.arg);
        command
    }
}

/// Executes actions of one type. Implementations register themselves with
/// `inventory::submit!` and are looked up by `kind()`.
#[async_trait]
pub trait ActionRunner: Send + Sync {
    fn kind(&self) -> &'static str;
    async fn run(&self, invocation: Invocation) -> io::Result<ExitStatus>;
}

inventory::collect!(&'static dyn ActionRunner);

pub struct ScriptRunner;

#[async_trait]
impl ActionRunner for ScriptRunner {
    fn kind(&self) -> &'static str {
        "script"
    }

    async fn run(&self, invocation: Invocation) -> io::Result<ExitStatus> {
        invocation.command().status().await
    }
}

inventory::submit! {
    &ScriptRunner as &'static dyn ActionRunner
}

fn runner_for(kind: &str) -> Option<&'static dyn ActionRunner> {
    inventory::iter::<&'static dyn ActionRunner>
        .into_iter()
        .find(|runner| runner.kind() == kind)
        .copied()
}

/// Result of a detached action run. Dropping it leaves the run going.
pub struct DispatchHandle {
    pub id: Uuid,
    task: JoinHandle<io::Result<ExitStatus>>,
}

impl DispatchHandle {
    pub async fn wait(self) -> io::Result<ExitStatus> {
        self.task.await.map_err(io::Error::other)?
    }
}

pub struct ActionDispatcher {
    scripts_dir: PathBuf,
    events: Arc<EventBus>,
}

impl ActionDispatcher {
    pub fn new(scripts_dir: impl Into<PathBuf>, events: Arc<EventBus>) -> Self {
        Self {
            scripts_dir: scripts_dir.into(),
            events,
        }
    }

    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }

    /// Starts `action` on its own task and returns without waiting for it.
    ///
    /// Spawn failures and non-zero exits are logged and published as
    /// `action_failed`; they never reach the caller of `dispatch`.
    pub fn dispatch(
        &self,
        action: &ActionDevice,
        raw_val: Option<&str>,
    ) -> Result<DispatchHandle, AppError> {
        let kind = action.kind.type_name();
        let runner = runner_for(kind).ok_or_else(|| AppError::NotImplemented(kind.to_string()))?;

        let id = Uuid::new_v4();
        let invocation = Invocation::for_action(&self.scripts_dir, action, raw_val);
        info!(
            action = %action.name,
            dispatch_id = %id,
            program = %invocation.program.display(),
            arg = %invocation.arg,
            "Action dispatched"
        );
        self.events.publish(
            ACTION_DISPATCHED,
            json!({ "action": action.name, "dispatch_id": id.to_string(), "arg": invocation.arg }),
        );

        let name = action.name.clone();
        let events = Arc::clone(&self.events);
        let task = tokio::spawn(async move {
            let outcome = runner.run(invocation).await;
            match &outcome {
                Ok(status) if status.success() => {
                    info!(action = %name, dispatch_id = %id, "Action has been completed");
                }
                Ok(status) => {
                    warn!(
                        action = %name,
                        dispatch_id = %id,
                        %status,
                        "Action exited unsuccessfully"
                    );
                    events.publish(
                        ACTION_FAILED,
                        json!({
                            "action": name,
                            "dispatch_id": id.to_string(),
                            "error": status.to_string(),
                        }),
                    );
                }
                Err(err) => {
                    warn!(
                        action = %name,
                        dispatch_id = %id,
                        error = %err,
                        "Action failed to start"
                    );
                    events.publish(
                        ACTION_FAILED,
                        json!({
                            "action": name,
                            "dispatch_id": id.to_string(),
                            "error": err.to_string(),
                        }),
                    );
                }
            }
            outcome
        });

        Ok(DispatchHandle { id, task })
    }
}

impl std::fmt::Debug for ActionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("scripts_dir", &self.scripts_dir)
            .finish()
    }
}
