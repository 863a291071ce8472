//! # oo-services
//!
//! Business logic services for OfficeOps RS.
//!
//! Every operation is a small service object built from the shared
//! [`ServiceContext`] and the acting user, then run with `call`. Services
//! check permissions and input, apply the pure model transitions and persist
//! the result, keeping evidence files consistent with the stored records.

pub mod context;
pub mod todos;
pub mod performance;
pub mod requests;
pub mod procurements;
pub mod assets;
pub mod meetings;
pub mod visitors;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::ServiceContext;
pub use performance::{daily_score, DailyReport, LeaderboardEntry, PerformanceService};
pub use requests::{ApproveRequest, RequestItemService, RequestWithRequester};
pub use procurements::ProcurementService;
pub use assets::{AssetService, AssetStatusChange};
pub use meetings::MeetingService;
pub use visitors::{IdentityVerifier, NoopIdentityVerifier, VisitorRegistration, VisitorService};
