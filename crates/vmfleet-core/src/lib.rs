//! vmfleet-core: batch lifecycle orchestration
//!
//! Runs start, stop and status actions across a host list with per-host
//! failure isolation and fixed pacing, tallies the outcomes, and lists the
//! fleet inventory.

pub mod action;
pub mod error;
pub mod hosts;
pub mod inventory;
pub mod orchestrator;
pub mod report;
pub mod tally;

pub use action::{ActionOutcome, BatchAction, ERROR_LABEL, UNKNOWN_STATE};
pub use error::CoreError;
pub use hosts::{HostEntry, load_hosts, parse_hosts};
pub use inventory::{
    InventoryFormat, VmRecord, fetch_inventory, inventory_summary, list_inventory,
    project_inventory, write_rows,
};
pub use orchestrator::{BatchOrchestrator, DEFAULT_PACING};
pub use report::{LineReporter, ProgressSink, progress_line, summary_line};
pub use tally::{BatchResult, Tally};
