//! Tool catalogue, submission lifecycle, output decoding and the realtime change feed.

pub mod catalogue;
pub mod lifecycle;
pub mod output;
pub mod realtime;
pub mod submit;

pub use catalogue::{find_tool, ToolInfo, AI_TOOLS};
pub use lifecycle::{submit_generation, SubmitOutcome, SubmitRequest};
pub use realtime::{GenerationChange, GenerationFeed, RealtimeHub};
pub use submit::{dispatch_function, EdgeResponse};
