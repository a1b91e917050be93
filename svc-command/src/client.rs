//! Executor boundary
//!
//! A [`Client`] owns the transport. Commands hand themselves to it through
//! the object-safe [`Dispatch`] view, so clients and batching layers can
//! drive any command without knowing its operation type.

use crate::error::CommandError;
use crate::http::Request;

/// Executes commands against a remote service
pub trait Client: Send + Sync {
    /// Send the command's request and drive it to a terminal state.
    ///
    /// Implementations are responsible for preparing the command first
    /// (through [`Dispatch::prepare_request`]) and must block until the
    /// transfer finishes. A [`CommandError`] returned through `anyhow` is
    /// handed back to the caller of `Command::execute` unchanged.
    fn execute(&self, command: &mut dyn Dispatch) -> anyhow::Result<()>;
}

/// What a client or batching layer can see of a command
pub trait Dispatch {
    /// Operation name
    fn name(&self) -> &str;

    /// Whether the command may be grouped with others
    fn can_batch(&self) -> bool;

    fn is_prepared(&self) -> bool;

    /// Prepare the command if needed and borrow its request for transfer
    fn prepare_request(&mut self) -> Result<&mut Request, CommandError>;
}
