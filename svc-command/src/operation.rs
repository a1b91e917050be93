//! Operation hooks
//!
//! An [`Operation`] supplies the parts of a command that differ per remote
//! operation: its name, declared parameters, how the request is built, and
//! optionally how the response becomes a result. The lifecycle itself lives
//! in [`crate::Command`].

use crate::http::{Request, Response};
use crate::materialize::{materialize, CommandOutput};
use crate::params::ParameterStore;
use svc_command_schema::ParamDescriptor;

/// Whether a command's parameters are validated before use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// Validate against the attached schema, or the declared parameters
    #[default]
    Declared,
    /// Skip validation entirely (dynamically configured operations)
    SkipsDeclared,
}

/// Per-operation behavior plugged into a [`crate::Command`]
pub trait Operation {
    /// Operation name used in logs and errors
    fn name(&self) -> &str;

    /// Validation capability, consulted at construction and at prepare time
    fn validation(&self) -> ValidationPolicy {
        ValidationPolicy::Declared
    }

    /// Parameters checked when no schema is attached.
    ///
    /// Usually `<Self as DeclaredParams>::PARAMS` from
    /// `#[derive(DeclaredParams)]`.
    fn declared_params(&self) -> &'static [ParamDescriptor] {
        &[]
    }

    /// Called once after construction-time validation
    fn init(&mut self, _params: &mut ParameterStore) {}

    /// Build the request from validated parameters.
    ///
    /// Called at most once per command, after strict validation.
    fn build(&mut self, params: &ParameterStore) -> anyhow::Result<Request>;

    /// Turn the completed response into the command result
    fn process(&self, response: &Response) -> CommandOutput {
        materialize(response)
    }
}
