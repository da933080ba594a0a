mod audit;
mod scan;

pub use audit::run_audit_command;
pub use scan::run_scan_remote;
