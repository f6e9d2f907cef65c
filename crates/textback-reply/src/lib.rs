//! Retrieval-augmented reply pipeline: prompt assembly, generation, the
//! double-text post-processor, the interactive loop and thread replies.
pub mod delay;
pub mod generator;
pub mod postprocess;
pub mod prompt;
pub mod session;
pub mod thread;

pub use delay::{FixedDelay, RandomDelay};
pub use generator::ReplyGenerator;
pub use postprocess::{finalize, strip_apostrophes, Outgoing};
pub use session::{ChatSession, SessionStats, TurnState};
pub use thread::{ReplyRequest, ReplyResponse, ThreadMessage, ThreadReplier, Vibe};
