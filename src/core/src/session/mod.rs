mod registry;
mod state;

pub use registry::{SessionCommit, SessionRegistry};
pub use state::{SessionError, SessionState, SessionView};
