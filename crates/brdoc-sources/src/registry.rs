//! Process-wide table of named data sources.
//!
//! Registration is eager at construction and closed afterwards; the
//! registry is shared read-only across requests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde_json::Value;
use sqlx::postgres::PgPool;
use tracing::info;

use crate::curl::CurlDataSource;
use crate::descriptor::{DataSourceDescriptor, DataSourceKind, DataSourceResult};
use crate::rest::{RestDataSource, RestMethod};
use crate::source::{DataSource, FetchParams};
use crate::sql::SqlDataSource;

/// One entry of a `fetch_multiple` request.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub source: String,
    pub params: FetchParams,
}

impl FetchConfig {
    pub fn new(source: impl Into<String>, params: FetchParams) -> Self {
        Self {
            source: source.into(),
            params,
        }
    }

    /// The common single-parameter case.
    pub fn for_project(source: impl Into<String>, project_id: &str) -> Self {
        let mut params = FetchParams::new();
        params.insert("project_id".to_string(), Value::from(project_id));
        Self::new(source, params)
    }
}

/// Registry of all available data sources.
pub struct DataSourceRegistry {
    sources: Vec<Arc<dyn DataSource>>,
    by_name: HashMap<String, usize>,
}

impl DataSourceRegistry {
    /// Empty registry, for tests substituting their own sources.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Registry pre-populated with the default B+R sources.
    ///
    /// SQL sources run against `pool` when given; without a pool they
    /// report a contained failure on fetch.
    pub fn with_defaults(pool: Option<PgPool>) -> Self {
        let mut registry = Self::new();
        registry.register_defaults(pool);
        info!(sources = registry.sources.len(), "data source registry initialised");
        registry
    }

    /// Register a source; the last registration under a name wins.
    pub fn register(&mut self, source: Arc<dyn DataSource>) {
        let name = source.descriptor().name;
        match self.by_name.get(&name) {
            Some(&idx) => self.sources[idx] = source,
            None => {
                self.by_name.insert(name, self.sources.len());
                self.sources.push(source);
            }
        }
    }

    /// Look up a source by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn DataSource>> {
        self.by_name.get(name).map(|&idx| &self.sources[idx])
    }

    /// Descriptors of all sources, in registration order.
    pub fn list(&self) -> Vec<DataSourceDescriptor> {
        self.sources.iter().map(|s| s.descriptor()).collect()
    }

    /// Execute a single named source. Unknown names and transport
    /// failures are reported inside the envelope, never raised.
    pub async fn fetch(&self, name: &str, params: &FetchParams) -> DataSourceResult {
        match self.get(name) {
            Some(source) => source.fetch(params).await,
            None => DataSourceResult::failure(
                name,
                DataSourceKind::Sql,
                name,
                format!("Source not found: {name}"),
            ),
        }
    }

    /// Concurrent fan-out across distinct sources.
    ///
    /// The returned pairs follow the input order; individual fetches
    /// complete in any order and one failure does not cancel the rest.
    pub async fn fetch_multiple(
        &self,
        configs: &[FetchConfig],
    ) -> Vec<(String, DataSourceResult)> {
        let futures = configs
            .iter()
            .map(|config| async move {
                let result = self.fetch(&config.source, &config.params).await;
                (config.source.clone(), result)
            })
            .collect::<Vec<_>>();
        join_all(futures).await
    }

    fn register_defaults(&mut self, pool: Option<PgPool>) {
        let param = |desc: &str| {
            let mut schema = std::collections::BTreeMap::new();
            schema.insert("project_id".to_string(), desc.to_string());
            schema
        };

        self.register(Arc::new(SqlDataSource::new(
            "project_info",
            r#"
            SELECT id, name, description, start_date, end_date,
                   status, fiscal_year, company_name, company_nip
            FROM read_models.projects
            WHERE id = :project_id
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            "Informacje o projektach B+R",
            param("UUID projektu"),
            pool.clone(),
        )));

        self.register(Arc::new(SqlDataSource::new(
            "expenses_summary",
            r#"
            SELECT
                e.id, e.invoice_number, e.invoice_date, e.vendor_name, e.vendor_nip,
                e.net_amount, e.vat_amount, e.gross_amount, e.currency,
                e.br_category, e.br_qualified, e.br_deduction_rate,
                e.br_qualification_reason,
                d.filename AS document_filename, d.id AS document_id
            FROM read_models.expenses e
            LEFT JOIN read_models.documents d ON e.document_id = d.id
            WHERE e.project_id = :project_id
            ORDER BY e.invoice_date ASC
            "#,
            "Zestawienie wydatków projektu",
            param("UUID projektu"),
            pool.clone(),
        )));

        self.register(Arc::new(SqlDataSource::new(
            "expenses_by_category",
            r#"
            SELECT
                br_category AS category,
                COUNT(*) AS count,
                SUM(gross_amount) AS total_gross,
                SUM(net_amount) AS total_net,
                SUM(CASE WHEN br_qualified THEN gross_amount ELSE 0 END) AS qualified_amount
            FROM read_models.expenses
            WHERE project_id = :project_id
            GROUP BY br_category
            ORDER BY total_gross DESC
            "#,
            "Wydatki pogrupowane według kategorii",
            param("UUID projektu"),
            pool.clone(),
        )));

        self.register(Arc::new(SqlDataSource::new(
            "timesheet_summary",
            r#"
            SELECT
                w.name AS worker_name,
                EXTRACT(YEAR FROM t.work_date)::int AS year,
                EXTRACT(MONTH FROM t.work_date)::int AS month,
                SUM(t.hours) AS total_hours,
                COUNT(DISTINCT t.work_date) AS days_worked
            FROM read_models.timesheet_entries t
            JOIN read_models.workers w ON t.worker_id = w.id
            WHERE t.project_id = :project_id
            GROUP BY w.name, EXTRACT(YEAR FROM t.work_date), EXTRACT(MONTH FROM t.work_date)
            ORDER BY year, month, worker_name
            "#,
            "Zestawienie godzin pracy",
            param("UUID projektu"),
            pool.clone(),
        )));

        self.register(Arc::new(SqlDataSource::new(
            "nexus_calculation",
            r#"
            WITH expense_categories AS (
                SELECT
                    SUM(CASE WHEN br_category IN
                        ('personnel_employment', 'personnel_civil', 'materials',
                         'equipment', 'depreciation', 'expertise', 'other')
                        THEN gross_amount ELSE 0 END) AS a_direct,
                    SUM(CASE WHEN br_category = 'external_services'
                        THEN gross_amount ELSE 0 END) AS b_unrelated,
                    SUM(CASE WHEN br_category = 'related_services'
                        THEN gross_amount ELSE 0 END) AS c_related,
                    SUM(CASE WHEN br_category = 'ip_purchase'
                        THEN gross_amount ELSE 0 END) AS d_ip
                FROM read_models.expenses
                WHERE project_id = :project_id
                  AND br_qualified = true
            )
            SELECT
                COALESCE(a_direct, 0) AS a_direct,
                COALESCE(b_unrelated, 0) AS b_unrelated,
                COALESCE(c_related, 0) AS c_related,
                COALESCE(d_ip, 0) AS d_ip,
                CASE
                    WHEN COALESCE(a_direct, 0) + COALESCE(b_unrelated, 0)
                       + COALESCE(c_related, 0) + COALESCE(d_ip, 0) = 0 THEN 1
                    ELSE LEAST(1, ((COALESCE(a_direct, 0) + COALESCE(b_unrelated, 0)) * 1.3) /
                         NULLIF(COALESCE(a_direct, 0) + COALESCE(b_unrelated, 0)
                              + COALESCE(c_related, 0) + COALESCE(d_ip, 0), 0))
                END AS nexus
            FROM expense_categories
            "#,
            "Obliczenie wskaźnika Nexus dla IP Box",
            param("UUID projektu"),
            pool.clone(),
        )));

        self.register(Arc::new(SqlDataSource::new(
            "revenues",
            r#"
            SELECT
                id, invoice_number, invoice_date, client_name, client_nip,
                net_amount, gross_amount, currency,
                ip_qualified, ip_description, document_id
            FROM read_models.revenues
            WHERE project_id = :project_id
            ORDER BY invoice_date ASC
            "#,
            "Przychody z projektu (IP Box)",
            param("UUID projektu"),
            pool,
        )));

        self.register(Arc::new(
            RestDataSource::new(
                "nbp_exchange_rate",
                "https://api.nbp.pl/api/exchangerates/rates/a/{currency}/{date}/",
                RestMethod::Get,
                "Kurs walut z NBP na dany dzień",
            )
            .with_timeout(Duration::from_secs(30)),
        ));
    }

    /// Register an additional cURL source; external integrations use this
    /// for endpoints a plain HTTP client cannot express.
    pub fn register_curl(&mut self, source: CurlDataSource) {
        self.register(Arc::new(source));
    }
}

impl Default for DataSourceRegistry {
    fn default() -> Self {
        Self::with_defaults(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Payload;
    use async_trait::async_trait;

    struct StaticSource {
        name: String,
        value: Value,
        fail: bool,
    }

    #[async_trait]
    impl DataSource for StaticSource {
        fn descriptor(&self) -> DataSourceDescriptor {
            DataSourceDescriptor {
                name: self.name.clone(),
                kind: DataSourceKind::Rest,
                description: String::new(),
                params: Default::default(),
                query_preview: None,
            }
        }

        async fn fetch(&self, _params: &FetchParams) -> DataSourceResult {
            if self.fail {
                DataSourceResult::failure(&self.name, DataSourceKind::Rest, &self.name, "down")
            } else {
                DataSourceResult::success(
                    &self.name,
                    DataSourceKind::Rest,
                    &self.name,
                    Payload::Scalar(self.value.clone()),
                )
            }
        }
    }

    #[test]
    fn defaults_register_all_required_sources() {
        let registry = DataSourceRegistry::with_defaults(None);
        for name in [
            "project_info",
            "expenses_summary",
            "expenses_by_category",
            "timesheet_summary",
            "nexus_calculation",
            "revenues",
            "nbp_exchange_rate",
        ] {
            assert!(registry.get(name).is_some(), "missing source {name}");
        }
        assert_eq!(registry.list().len(), 7);
    }

    #[tokio::test]
    async fn unknown_source_is_an_error_value() {
        let registry = DataSourceRegistry::new();
        let result = registry.fetch("nope", &FetchParams::new()).await;
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn fan_out_preserves_input_order_and_contains_failures() {
        let mut registry = DataSourceRegistry::new();
        registry.register(Arc::new(StaticSource {
            name: "ok".to_string(),
            value: Value::from(1),
            fail: false,
        }));
        registry.register(Arc::new(StaticSource {
            name: "down".to_string(),
            value: Value::Null,
            fail: true,
        }));

        let results = registry
            .fetch_multiple(&[
                FetchConfig::new("down", FetchParams::new()),
                FetchConfig::new("ok", FetchParams::new()),
            ])
            .await;

        assert_eq!(results[0].0, "down");
        assert!(!results[0].1.is_success());
        assert_eq!(results[1].0, "ok");
        assert!(results[1].1.is_success());
    }
}
