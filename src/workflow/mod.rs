pub mod classify_flow;
pub mod job_ctx;

pub use classify_flow::ClassifyFlow;
pub use job_ctx::JobCtx;
