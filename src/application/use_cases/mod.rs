pub mod approval;
pub mod bulk_ops;
pub mod csv_transfer;
pub mod orchestrator;

pub use approval::ApprovalWorkflowEngine;
pub use bulk_ops::BulkShiftOps;
pub use csv_transfer::CsvTransfer;
pub use orchestrator::ShiftOrchestrator;
