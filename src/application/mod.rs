//! Application layer - the tool-call execution pipeline.

pub mod dispatcher;

pub use dispatcher::{
    ConfirmationService, ExecutionPipeline, PreviewGenerator, ProposalOutcome, SyncService,
    ToolDispatcher,
};
