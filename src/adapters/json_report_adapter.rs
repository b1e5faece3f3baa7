//! JSON report adapter: the payload a chart frontend renders from.

use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::domain::dashboard::Dashboard;
use crate::domain::error::DashboardError;
use crate::domain::version::VersionRecord;
use crate::ports::report_port::ReportPort;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportDocument<'a> {
    version: &'a VersionRecord,
    created: String,
    dashboard: &'a Dashboard,
}

#[derive(Debug, Clone, Default)]
pub struct JsonReportAdapter {
    pub pretty: bool,
}

impl JsonReportAdapter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn render(
        &self,
        dashboard: &Dashboard,
        version: &VersionRecord,
    ) -> Result<String, DashboardError> {
        let doc = ReportDocument {
            version,
            created: version.created_display(),
            dashboard,
        };
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&doc)
        } else {
            serde_json::to_string(&doc)
        };
        rendered.map_err(|e| DashboardError::Report {
            reason: e.to_string(),
        })
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        dashboard: &Dashboard,
        version: &VersionRecord,
        output_path: &str,
    ) -> Result<(), DashboardError> {
        let json = self.render(dashboard, version)?;
        if let Some(parent) = Path::new(output_path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output_path, json)?;
        tracing::info!(path = output_path, "report written");
        Ok(())
    }
}
