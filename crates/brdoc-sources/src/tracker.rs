//! Variable tracking with verifiable source URLs.
//!
//! Every scalar that ends up in a generated document can carry a footnote
//! pointing back to the API endpoint that serves its value. The tracker
//! is owned by a single generation request and never shared.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tracked variable with its verification URL and footnote ordinal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedVariable {
    pub name: String,
    pub value: Value,
    pub source_name: String,
    pub path: String,
    pub source_url: String,
    /// 1-based ordinal in insertion order; dense within one generation.
    pub ordinal: usize,
    pub fetched_at: DateTime<Utc>,
}

impl TrackedVariable {
    /// Markdown footnote reference, `[^n]`.
    pub fn footnote_ref(&self) -> String {
        format!("[^{}]", self.ordinal)
    }

    /// Markdown footnote definition line.
    pub fn footnote_def(&self) -> String {
        format!("[^{}]: Źródło: [{}]({})", self.ordinal, self.name, self.source_url)
    }
}

/// Per-request variable tracker.
pub struct VariableTracker {
    base_url: String,
    project_id: Option<String>,
    variables: Vec<TrackedVariable>,
}

impl VariableTracker {
    /// The base URL and project id are fixed at construction; ambient
    /// request context is never assumed.
    pub fn new(base_url: impl Into<String>, project_id: Option<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            project_id,
            variables: Vec::new(),
        }
    }

    fn build_url(&self, source_name: &str, path: &str, invoice_id: Option<&str>) -> String {
        if let Some(invoice) = invoice_id {
            let field = if path.is_empty() { source_name } else { path };
            return format!("{}/api/invoice/{invoice}/variable/{field}", self.base_url);
        }
        let mut url = match &self.project_id {
            Some(pid) => format!("{}/api/project/{pid}/variable/{source_name}", self.base_url),
            None => format!("{}/api/variable/{source_name}", self.base_url),
        };
        if !path.is_empty() {
            url.push('/');
            url.push_str(path);
        }
        url
    }

    /// Track a variable and return its footnote reference (`[^n]`).
    pub fn track(
        &mut self,
        name: impl Into<String>,
        value: Value,
        source_name: impl Into<String>,
        path: impl Into<String>,
        invoice_id: Option<&str>,
    ) -> String {
        let name = name.into();
        let source_name = source_name.into();
        let path = path.into();
        let ordinal = self.variables.len() + 1;
        let source_url = self.build_url(&source_name, &path, invoice_id);

        let variable = TrackedVariable {
            name,
            value,
            source_name,
            path,
            source_url,
            ordinal,
            fetched_at: Utc::now(),
        };
        let reference = variable.footnote_ref();
        self.variables.push(variable);
        reference
    }

    /// Track a Nexus formula component.
    pub fn track_nexus(&mut self, component: &str, value: f64) -> String {
        self.track(
            format!("nexus_{component}"),
            Value::from(value),
            "nexus_calculation",
            component,
            None,
        )
    }

    /// Track an invoice-bound field.
    pub fn track_invoice(&mut self, field: &str, value: Value, invoice_id: &str) -> String {
        self.track(field, value, "invoice", field, Some(invoice_id))
    }

    /// All tracked variables, in insertion order.
    pub fn variables(&self) -> &[TrackedVariable] {
        &self.variables
    }

    pub fn count(&self) -> usize {
        self.variables.len()
    }

    /// Render the footnotes section appended to every generated document.
    pub fn footnotes_section(&self) -> String {
        if self.variables.is_empty() {
            return String::new();
        }
        let mut lines = vec![
            String::new(),
            "---".to_string(),
            String::new(),
            "## Przypisy źródłowe".to_string(),
            String::new(),
            "Każda zmienna w tym dokumencie jest weryfikowalna poprzez poniższe linki API:"
                .to_string(),
            String::new(),
        ];
        for variable in &self.variables {
            lines.push(variable.footnote_def());
        }
        lines.join("\n")
    }

    /// Render the tracked variables as a Markdown verification table.
    pub fn verification_table(&self) -> String {
        if self.variables.is_empty() {
            return String::new();
        }
        let mut lines = vec![
            String::new(),
            "## Tabela weryfikacji zmiennych".to_string(),
            String::new(),
            "| Zmienna | Wartość | URL weryfikacji |".to_string(),
            "|---------|---------|-----------------|".to_string(),
        ];
        for variable in &self.variables {
            let raw = match &variable.value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let shown: String = if raw.chars().count() > 30 {
                let truncated: String = raw.chars().take(27).collect();
                format!("{truncated}...")
            } else {
                raw
            };
            lines.push(format!(
                "| {} | {} | [{}]({}) |",
                variable.name, shown, variable.source_name, variable.source_url
            ));
        }
        lines.join("\n")
    }

    /// Drop all tracked variables and restart ordinals at 1.
    pub fn clear(&mut self) {
        self.variables.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ordinals_are_dense_and_refs_match_defs() {
        let mut tracker = VariableTracker::new("http://localhost:81", Some("p-1".to_string()));
        let r1 = tracker.track("total_costs", json!(50000), "expenses_summary", "total_gross", None);
        let r2 = tracker.track_nexus("a", 120_000.0);
        let r3 = tracker.track_invoice("gross_amount", json!(1230.0), "inv-9");

        assert_eq!(r1, "[^1]");
        assert_eq!(r2, "[^2]");
        assert_eq!(r3, "[^3]");

        let section = tracker.footnotes_section();
        assert!(section.contains("## Przypisy źródłowe"));
        for n in 1..=3 {
            assert!(section.contains(&format!("[^{n}]: Źródło:")));
        }
    }

    #[test]
    fn urls_follow_the_api_shape() {
        let mut tracker = VariableTracker::new("http://localhost:81/", Some("p-1".to_string()));
        tracker.track("x", json!(1), "nexus_calculation", "nexus", None);
        tracker.track_invoice("vendor_nip", json!("5881918662"), "inv-7");

        let vars = tracker.variables();
        assert_eq!(
            vars[0].source_url,
            "http://localhost:81/api/project/p-1/variable/nexus_calculation/nexus"
        );
        assert_eq!(
            vars[1].source_url,
            "http://localhost:81/api/invoice/inv-7/variable/vendor_nip"
        );
    }

    #[test]
    fn without_project_id_urls_fall_back_to_plain_variable_path() {
        let mut tracker = VariableTracker::new("http://localhost:81", None);
        tracker.track("kurs", json!(4.32), "nbp_exchange_rate", "mid", None);
        assert_eq!(
            tracker.variables()[0].source_url,
            "http://localhost:81/api/variable/nbp_exchange_rate/mid"
        );
    }

    #[test]
    fn verification_table_truncates_long_values() {
        let mut tracker = VariableTracker::new("http://localhost:81", None);
        tracker.track(
            "opis",
            json!("a very long value that will definitely be truncated"),
            "project_info",
            "description",
            None,
        );
        let table = tracker.verification_table();
        assert!(table.contains("..."));
        assert!(table.contains("| Zmienna | Wartość | URL weryfikacji |"));
    }

    #[test]
    fn empty_tracker_renders_nothing() {
        let tracker = VariableTracker::new("http://localhost:81", None);
        assert!(tracker.footnotes_section().is_empty());
        assert!(tracker.verification_table().is_empty());
    }
}
