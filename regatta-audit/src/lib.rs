//! regatta-audit: capture reconciliation
//!
//! Cross-checks the on-disk capture tree against the canonical document:
//! - `expected`: races the document says should exist
//! - `scanner`: race folders actually captured
//! - `packet`: capture file listing and closing-status extraction
//! - `reconcile`: event/race classification and completion metrics
//! - `report`: text rendering
//! - `plan`: where each expected race's captures should live

pub mod expected;
pub mod packet;
pub mod plan;
pub mod reconcile;
pub mod report;
pub mod scanner;

pub use expected::{build_expected_index, ExpectedRace};
pub use packet::{CapturePacket, PacketError, PacketStatus};
pub use plan::{plan_captures, render_plan, PlannedCapture};
pub use reconcile::{AuditReport, IncompleteEvent, RaceFinding, Reconciler, Verdict};
pub use report::ReportFormatter;
pub use scanner::{CaptureScanner, DownloadedRace, ScanError};
