//! Business services wiring domain logic to the persistence layer.

pub mod audit;
pub mod leave;
pub mod report;
pub mod time_tracking;

pub use audit::AuditRecorder;
pub use leave::{LeaveDecision, LeaveService};
pub use report::ComplianceReportService;
pub use time_tracking::TimeTrackingService;

use domain::models::RequestOrigin;
use uuid::Uuid;

/// Who triggered an operation and where the request came from. Attached to
/// every audited action.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub actor_id: Uuid,
    pub origin: Option<RequestOrigin>,
}

impl ActionContext {
    pub fn new(actor_id: Uuid) -> Self {
        Self {
            actor_id,
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: RequestOrigin) -> Self {
        self.origin = Some(origin);
        self
    }
}
