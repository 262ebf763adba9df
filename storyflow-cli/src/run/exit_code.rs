//! Process exit codes per error kind.

use storyflow::{AgentError, CompilationError, GraphError, TruncationError, WorkflowError};

use crate::config::{ConfigError, Error};

/// A node or collaborator failed.
pub const EXIT_EXECUTION: i32 = 1;
/// Bad configuration or a graph wiring defect.
pub const EXIT_CONFIGURATION: i32 = 2;
/// The run hit the recursion limit before reaching END.
pub const EXIT_RECURSION_LIMIT: i32 = 3;

/// Maps a run error to its exit code.
pub fn exit_code(err: &Error) -> i32 {
    if let Some(e) = err.downcast_ref::<AgentError>() {
        return match e {
            AgentError::RecursionLimitExceeded { .. } => EXIT_RECURSION_LIMIT,
            AgentError::Truncation(TruncationError::InvalidParameter { .. }) => EXIT_CONFIGURATION,
            e if e.is_configuration() => EXIT_CONFIGURATION,
            _ => EXIT_EXECUTION,
        };
    }
    if err.is::<ConfigError>()
        || err.is::<WorkflowError>()
        || err.is::<GraphError>()
        || err.is::<CompilationError>()
        || err.is::<TruncationError>()
    {
        return EXIT_CONFIGURATION;
    }
    EXIT_EXECUTION
}
