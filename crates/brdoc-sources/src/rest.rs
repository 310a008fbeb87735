//! REST data source with `{name}`-templated URLs.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::error;

use crate::descriptor::{DataSourceDescriptor, DataSourceKind, DataSourceResult, Payload};
use crate::source::{DataSource, FetchParams};

/// HTTP method of a REST source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestMethod {
    Get,
    Post,
}

/// REST API data source.
///
/// Parameters matching a `{name}` segment substitute into the URL; the
/// remainder become query-string entries for GET and a JSON body for POST.
/// Clients are short-lived, one per call.
pub struct RestDataSource {
    name: String,
    description: String,
    url_template: String,
    method: RestMethod,
    headers: BTreeMap<String, String>,
    timeout: Duration,
}

impl RestDataSource {
    pub fn new(
        name: impl Into<String>,
        url_template: impl Into<String>,
        method: RestMethod,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            url_template: url_template.into(),
            method,
            headers: BTreeMap::new(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    fn value_as_segment(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Substitute path parameters; return the URL and the leftover params.
    fn build_url(&self, params: &FetchParams) -> (String, BTreeMap<String, Value>) {
        let mut url = self.url_template.clone();
        let mut leftover = BTreeMap::new();
        for (key, value) in params {
            let placeholder = format!("{{{key}}}");
            if url.contains(&placeholder) {
                url = url.replace(&placeholder, &Self::value_as_segment(value));
            } else if !value.is_null() {
                leftover.insert(key.clone(), value.clone());
            }
        }
        (url, leftover)
    }

    async fn execute(&self, params: &FetchParams) -> Result<(String, Value), String> {
        let (url, leftover) = self.build_url(params);

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| e.to_string())?;

        let mut request = match self.method {
            RestMethod::Get => {
                let query: Vec<(String, String)> = leftover
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::value_as_segment(v)))
                    .collect();
                client.get(&url).query(&query)
            }
            RestMethod::Post => client.post(&url).json(&leftover),
        };
        for (name, value) in &self.headers {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {status} from {url}"));
        }
        let body: Value = response.json().await.map_err(|e| e.to_string())?;
        Ok((url, body))
    }
}

#[async_trait]
impl DataSource for RestDataSource {
    fn descriptor(&self) -> DataSourceDescriptor {
        DataSourceDescriptor {
            name: self.name.clone(),
            kind: DataSourceKind::Rest,
            description: self.description.clone(),
            params: BTreeMap::new(),
            query_preview: Some(self.url_template.clone()),
        }
    }

    async fn fetch(&self, params: &FetchParams) -> DataSourceResult {
        match self.execute(params).await {
            Ok((url, body)) => {
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
                    DataSourceKind::Rest,
                    format!("{}: {url}", self.name),
                    payload,
                )
            }
            Err(e) => {
                error!(source = %self.name, error = %e, "rest source fetch failed");
                DataSourceResult::failure(&self.name, DataSourceKind::Rest, &self.name, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_params_substitute_and_leftovers_become_query() {
        let source = RestDataSource::new(
            "nbp_exchange_rate",
            "https://api.nbp.pl/api/exchangerates/rates/a/{currency}/{date}/",
            RestMethod::Get,
            "Kurs walut z NBP",
        );
        let mut params = FetchParams::new();
        params.insert("currency".to_string(), json!("EUR"));
        params.insert("date".to_string(), json!("2025-03-14"));
        params.insert("format".to_string(), json!("json"));

        let (url, leftover) = source.build_url(&params);
        assert_eq!(
            url,
            "https://api.nbp.pl/api/exchangerates/rates/a/EUR/2025-03-14/"
        );
        assert_eq!(leftover.len(), 1);
        assert!(leftover.contains_key("format"));
    }
}
