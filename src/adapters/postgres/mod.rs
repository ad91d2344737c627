//! PostgreSQL adapters.

mod pending_call_repository;
mod planning_reader;
mod planning_store;
mod sync_log;
mod transaction;

pub use pending_call_repository::PostgresPendingCallRepository;
pub use planning_reader::PostgresPlanningReader;
pub use planning_store::PostgresPlanningStore;
pub use sync_log::PostgresSyncLog;
pub use transaction::{
    is_retryable_db_error, is_retryable_message, is_retryable_sqlstate, run_with_retries,
    CascadeOp, CascadeOutcome, RetryPolicy, TransactionRunner, TxOp, TxOpError,
};
