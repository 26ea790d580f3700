//! Platform operations the migration workflow needs
//!
//! [`CfCliPlatform`] drives the `cf` CLI, which already holds the user's
//! login session and target.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace};

use super::error::{PlatformError, PlatformResult};

/// Operations against the platform hosting the service instances
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlatformClient: Send + Sync {
    async fn service_exists(&self, name: &str) -> bool;

    /// Create an instance and wait until provisioning finishes
    async fn create_service_instance(
        &self,
        product: &str,
        plan: &str,
        name: &str,
    ) -> PlatformResult<()>;

    async fn get_hostnames(&self, name: &str) -> PlatformResult<Vec<String>>;

    /// Apply arbitrary parameters and wait until the update finishes
    async fn update_service_config(
        &self,
        name: &str,
        params: &serde_json::Value,
    ) -> PlatformResult<()>;

    async fn bind_service(&self, app: &str, service: &str) -> PlatformResult<()>;

    async fn delete_app(&self, app: &str) -> PlatformResult<()>;

    async fn delete_service_instance(&self, name: &str) -> PlatformResult<()>;

    async fn recent_logs(&self, app: &str) -> PlatformResult<String>;

    async fn push_app(&self, path: &Path, app: &str) -> PlatformResult<()>;

    async fn rename_service(&self, old_name: &str, new_name: &str) -> PlatformResult<()>;

    /// Run a one-off task on the app and wait for it to finish
    async fn run_task(&self, app: &str, command: &str) -> PlatformResult<()>;

    async fn start_app(&self, app: &str) -> PlatformResult<()>;
}

/// Default time allowed for provisioning, updates and tasks (30 minutes)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Default interval between status polls
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

const TASK_NAME: &str = "migrate";
const SERVICE_KEY_NAME: &str = "MIGRATE-HOSTNAMES";

/// [`PlatformClient`] backed by the `cf` CLI
#[derive(Debug, Clone)]
pub struct CfCliPlatform {
    cf_binary: PathBuf,
    timeout: Duration,
    interval: Duration,
}

impl Default for CfCliPlatform {
    fn default() -> Self {
        Self::new("cf")
    }
}

impl CfCliPlatform {
    pub fn new(cf_binary: impl Into<PathBuf>) -> Self {
        Self {
            cf_binary: cf_binary.into(),
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn with_polling(mut self, timeout: Duration, interval: Duration) -> Self {
        self.timeout = timeout;
        self.interval = interval;
        self
    }

    async fn cf(&self, args: &[&str]) -> PlatformResult<String> {
        debug!(command = %args.join(" "), "Running cf");
        let output = Command::new(&self.cf_binary).args(args).output().await?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        trace!(%stdout, "cf output");
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = [stderr.trim(), stdout.trim()]
                .into_iter()
                .find(|s| !s.is_empty())
                .unwrap_or("no output")
                .to_string();
            return Err(PlatformError::CommandFailed {
                command: args.first().copied().unwrap_or_default().to_string(),
                message,
            });
        }
        Ok(stdout)
    }

    /// Poll `cf service` until the last operation settles
    async fn wait_for_service(&self, name: &str) -> PlatformResult<()> {
        let what = format!("service instance {name}");
        self.poll(&what, move || async move {
            let output = self.cf(&["service", name]).await?;
            Ok(parse_operation_status(&output))
        })
        .await
    }

    async fn poll<F, Fut>(&self, what: &str, mut check: F) -> PlatformResult<()>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = PlatformResult<OperationStatus>>,
    {
        let start = Instant::now();
        loop {
            match check().await? {
                OperationStatus::Succeeded => return Ok(()),
                OperationStatus::Failed(message) => {
                    return Err(PlatformError::Failed {
                        what: what.to_string(),
                        message,
                    });
                }
                OperationStatus::InProgress => {
                    if start.elapsed() > self.timeout {
                        return Err(PlatformError::Timeout {
                            what: what.to_string(),
                            seconds: self.timeout.as_secs(),
                        });
                    }
                    tokio::time::sleep(self.interval).await;
                }
            }
        }
    }
}

#[async_trait]
impl PlatformClient for CfCliPlatform {
    async fn service_exists(&self, name: &str) -> bool {
        self.cf(&["service", name, "--guid"]).await.is_ok()
    }

    async fn create_service_instance(
        &self,
        product: &str,
        plan: &str,
        name: &str,
    ) -> PlatformResult<()> {
        self.cf(&["create-service", product, plan, name]).await?;
        self.wait_for_service(name).await
    }

    async fn get_hostnames(&self, name: &str) -> PlatformResult<Vec<String>> {
        self.cf(&["create-service-key", name, SERVICE_KEY_NAME]).await?;
        let output = self.cf(&["service-key", name, SERVICE_KEY_NAME]).await;
        let cleanup = self
            .cf(&["delete-service-key", "-f", name, SERVICE_KEY_NAME])
            .await;
        let hostnames = parse_service_key_hostnames(&output?)?;
        cleanup?;
        Ok(hostnames)
    }

    async fn update_service_config(
        &self,
        name: &str,
        params: &serde_json::Value,
    ) -> PlatformResult<()> {
        let params = params.to_string();
        self.cf(&["update-service", name, "-c", params.as_str()])
            .await?;
        self.wait_for_service(name).await
    }

    async fn bind_service(&self, app: &str, service: &str) -> PlatformResult<()> {
        self.cf(&["bind-service", app, service]).await.map(|_| ())
    }

    async fn delete_app(&self, app: &str) -> PlatformResult<()> {
        self.cf(&["delete", "-f", app]).await.map(|_| ())
    }

    async fn delete_service_instance(&self, name: &str) -> PlatformResult<()> {
        self.cf(&["delete-service", "-f", name]).await.map(|_| ())
    }

    async fn recent_logs(&self, app: &str) -> PlatformResult<String> {
        self.cf(&["logs", "--recent", app]).await
    }

    async fn push_app(&self, path: &Path, app: &str) -> PlatformResult<()> {
        let path = path.to_string_lossy().into_owned();
        self.cf(&[
            "push",
            app,
            "-p",
            path.as_str(),
            "-b",
            "binary_buildpack",
            "-u",
            "none",
            "-c",
            "sleep infinity",
            "--no-route",
            "--no-start",
        ])
        .await
        .map(|_| ())
    }

    async fn rename_service(&self, old_name: &str, new_name: &str) -> PlatformResult<()> {
        self.cf(&["rename-service", old_name, new_name])
            .await
            .map(|_| ())
    }

    async fn run_task(&self, app: &str, command: &str) -> PlatformResult<()> {
        self.cf(&["run-task", app, command, "--name", TASK_NAME])
            .await?;
        let what = format!("task {TASK_NAME} on {app}");
        self.poll(&what, move || async move {
            let output = self.cf(&["tasks", app]).await?;
            parse_task_state(&output, TASK_NAME).ok_or_else(|| {
                PlatformError::UnexpectedOutput(format!("task {TASK_NAME} not listed for {app}"))
            })
        })
        .await
    }

    async fn start_app(&self, app: &str) -> PlatformResult<()> {
        self.cf(&["start", app]).await.map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum OperationStatus {
    InProgress,
    Succeeded,
    Failed(String),
}

/// Read the `status:` line of `cf service` output
fn parse_operation_status(output: &str) -> OperationStatus {
    let status = output
        .lines()
        .map(str::trim)
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case("status")
                .then(|| value.trim().to_lowercase())
        })
        .unwrap_or_default();

    if status.ends_with("succeeded") {
        OperationStatus::Succeeded
    } else if status.ends_with("failed") {
        let message = output
            .lines()
            .find_map(|line| line.trim().strip_prefix("message:"))
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or(status);
        OperationStatus::Failed(message)
    } else {
        OperationStatus::InProgress
    }
}

/// Find the state of the most recent task called `name` in `cf tasks` output
///
/// Rows look like `1   migrate   SUCCEEDED   Tue 01 Jan ...   ./migrate a b`,
/// newest first.
fn parse_task_state(output: &str, name: &str) -> Option<OperationStatus> {
    output.lines().find_map(|line| {
        let mut columns = line.split_whitespace();
        let id = columns.next()?;
        if !id.chars().all(|c| c.is_ascii_digit()) || columns.next()? != name {
            return None;
        }
        Some(match columns.next()? {
            "SUCCEEDED" => OperationStatus::Succeeded,
            "FAILED" => OperationStatus::Failed(format!("task {id} failed")),
            _ => OperationStatus::InProgress,
        })
    })
}

/// Pull the hostname(s) out of `cf service-key` output
///
/// The credentials JSON follows a one-line header.
fn parse_service_key_hostnames(output: &str) -> PlatformResult<Vec<String>> {
    let start = output
        .find('{')
        .ok_or_else(|| PlatformError::UnexpectedOutput("no credentials in service key".to_string()))?;
    let credentials: serde_json::Value = serde_json::from_str(&output[start..])
        .map_err(|e| PlatformError::UnexpectedOutput(format!("service key credentials: {e}")))?;
    let credentials = credentials.get("credentials").unwrap_or(&credentials);

    let hostnames: Vec<String> = match credentials.get("hostnames") {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|h| h.as_str().map(str::to_string))
            .collect(),
        _ => credentials
            .get("hostname")
            .and_then(|h| h.as_str())
            .map(|h| vec![h.to_string()])
            .unwrap_or_default(),
    };

    if hostnames.is_empty() {
        return Err(PlatformError::UnexpectedOutput(
            "service key has no hostname".to_string(),
        ));
    }
    Ok(hostnames)
}
