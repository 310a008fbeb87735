//! Subprocess cURL data source for endpoints no HTTP client can express.

use std::collections::BTreeMap;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::error;

use crate::descriptor::{DataSourceDescriptor, DataSourceKind, DataSourceResult, Payload};
use crate::source::{DataSource, FetchParams};

/// Data source executing a templated `curl` command line.
///
/// The subprocess is killed outright when the timeout elapses.
pub struct CurlDataSource {
    name: String,
    description: String,
    curl_template: String,
    parse_json: bool,
    timeout: Duration,
}

impl CurlDataSource {
    pub fn new(
        name: impl Into<String>,
        curl_template: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            curl_template: curl_template.into(),
            parse_json: true,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn raw_output(mut self) -> Self {
        self.parse_json = false;
        self
    }

    fn build_command(&self, params: &FetchParams) -> String {
        let mut cmd = self.curl_template.clone();
        for (key, value) in params {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            cmd = cmd.replace(&format!("{{{key}}}"), &rendered);
        }
        cmd
    }

    async fn execute(&self, params: &FetchParams) -> Result<(String, Value), String> {
        let cmd = self.build_command(params);

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&cmd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| e.to_string())?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| e.to_string())?,
            Err(_) => {
                return Err(format!("curl timeout after {}s", self.timeout.as_secs()));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("curl failed: {stderr}"));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let data = if self.parse_json {
            serde_json::from_str(&stdout).map_err(|e| format!("invalid JSON output: {e}"))?
        } else {
            Value::String(stdout)
        };
        Ok((cmd, data))
    }
}

#[async_trait]
impl DataSource for CurlDataSource {
    fn descriptor(&self) -> DataSourceDescriptor {
        DataSourceDescriptor {
            name: self.name.clone(),
            kind: DataSourceKind::Curl,
            description: self.description.clone(),
            params: BTreeMap::new(),
            query_preview: Some(self.curl_template.clone()),
        }
    }

    async fn fetch(&self, params: &FetchParams) -> DataSourceResult {
        match self.execute(params).await {
            Ok((cmd, body)) => {
                let preview: String = cmd.chars().take(50).collect();
                let payload = match body {
                    Value::Array(items) => Payload::Rows(
                        items
                            .into_iter()
                            .filter_map(|v| v.as_object().cloned())
                            .collect(),
                    ),
                    Value::Object(map) => Payload::Map(map),
                    scalar => Payload::Scalar(scalar),
                };
                DataSourceResult::success(
                    &self.name,
                    DataSourceKind::Curl,
                    format!("{}: {preview}...", self.name),
                    payload,
                )
            }
            Err(e) => {
                error!(source = %self.name, error = %e, "curl source fetch failed");
                DataSourceResult::failure(&self.name, DataSourceKind::Curl, &self.name, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn template_substitution() {
        let source = CurlDataSource::new("ext", "curl -s https://example.com/{id}", "");
        let mut params = FetchParams::new();
        params.insert("id".to_string(), json!("abc"));
        assert_eq!(
            source.build_command(&params),
            "curl -s https://example.com/abc"
        );
    }

    #[tokio::test]
    async fn failing_command_is_contained() {
        let source = CurlDataSource::new("bad", "exit 3", "");
        let result = source.fetch(&FetchParams::new()).await;
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn json_output_is_parsed() {
        let source = CurlDataSource::new("echo", "echo '{\"ok\": true}'", "");
        let result = source.fetch(&FetchParams::new()).await;
        assert!(result.is_success());
        assert_eq!(result.payload.get_path("ok"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn timeout_kills_the_subprocess() {
        let source =
            CurlDataSource::new("slow", "sleep 5", "").with_timeout(Duration::from_millis(100));
        let result = source.fetch(&FetchParams::new()).await;
        assert!(!result.is_success());
        assert!(result.error.as_deref().unwrap_or("").contains("timeout"));
    }
}
