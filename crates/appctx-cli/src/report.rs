//! Service table rendering for the `inspect` command

use appctx_registry::{RegistryStats, ServiceRegistry, ServiceState};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt::Write as _;

pub(crate) struct ServiceRow {
    pub(crate) name: String,
    pub(crate) state: ServiceState,
    pub(crate) error: Option<String>,
}

pub(crate) struct Report {
    pub(crate) label: String,
    pub(crate) rows: Vec<ServiceRow>,
    pub(crate) stats: RegistryStats,
}

impl Report {
    /// Snapshot a registry; `errors` holds lookup failures keyed by service name
    ///
    /// Failed names the registry does not know are listed after the
    /// registered ones as `unregistered`.
    pub(crate) fn collect(registry: &ServiceRegistry, errors: &BTreeMap<String, String>) -> Self {
        let mut rows: Vec<ServiceRow> = registry
            .snapshot()
            .into_iter()
            .map(|(name, state)| ServiceRow {
                error: errors.get(name.as_str()).cloned(),
                name: name.to_string(),
                state,
            })
            .collect();

        for (name, error) in errors {
            if !registry.contains(name) {
                rows.push(ServiceRow {
                    name: name.clone(),
                    state: ServiceState::Unregistered,
                    error: Some(error.clone()),
                });
            }
        }

        Self {
            label: registry.label().to_string(),
            rows,
            stats: registry.stats(),
        }
    }

    pub(crate) fn to_text(&self) -> String {
        let width = self
            .rows
            .iter()
            .map(|row| row.name.len())
            .max()
            .unwrap_or(0)
            .max("SERVICE".len());

        let mut out = String::new();
        let _ = writeln!(out, "Registry: {}", self.label);
        let _ = writeln!(out, "{:<width$}  STATE", "SERVICE");
        for row in &self.rows {
            let _ = write!(out, "{:<width$}  {}", row.name, row.state);
            if let Some(error) = &row.error {
                let _ = write!(out, "  ({error})");
            }
            out.push('\n');
        }
        let _ = writeln!(
            out,
            "\n{} registered, {} constructed, {} attempts, {} failures, {} cache hits",
            self.stats.registered,
            self.stats.constructed,
            self.stats.construction_attempts,
            self.stats.construction_failures,
            self.stats.cache_hits
        );
        out
    }

    pub(crate) fn to_json(&self) -> Value {
        let services: Vec<Value> = self
            .rows
            .iter()
            .map(|row| {
                let mut service = json!({
                    "name": row.name,
                    "state": row.state.as_str(),
                });
                if let Some(error) = &row.error {
                    service["error"] = json!(error);
                }
                service
            })
            .collect();

        json!({
            "registry": self.label,
            "services": services,
            "stats": {
                "registered": self.stats.registered,
                "constructed": self.stats.constructed,
                "construction_attempts": self.stats.construction_attempts,
                "construction_failures": self.stats.construction_failures,
                "cache_hits": self.stats.cache_hits,
            },
        })
    }
}
