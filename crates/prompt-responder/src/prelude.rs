//! Convenient re-exports for common prompt-responder usage.
//!
//! ```ignore
//! use prompt_responder::prelude::*;
//! ```

// Core types
pub use crate::answers::Answers;
pub use crate::config::{LineEnding, SessionConfig};

// Error handling
pub use crate::error::{ResponderError, Result, SpawnError};

// Macros
pub use crate::{regex, rules};

// Interpreter
pub use crate::responder::{Detection, Responder};
pub use crate::rules::{Response, Rule, RuleTable};
pub use crate::settle::PendingBuffer;
pub use crate::transcript::{EntryKind, Transcript};

// Session types
pub use crate::session::{Session, SessionBuilder, SessionOutput};

// Sync wrapper
pub use crate::sync::block_on;
