//! Report output port trait.

use crate::domain::dashboard::Dashboard;
use crate::domain::error::DashboardError;
use crate::domain::version::VersionRecord;

/// Port for handing a computed dashboard to a renderer.
pub trait ReportPort {
    fn write(
        &self,
        dashboard: &Dashboard,
        version: &VersionRecord,
        output_path: &str,
    ) -> Result<(), DashboardError>;
}
