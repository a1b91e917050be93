//! Closure-configured operations
//!
//! For one-off calls that do not warrant an operation type: the request is
//! built by a closure supplied at runtime. These commands skip parameter
//! validation entirely since there is nothing declared to check against.

use crate::command::Command;
use crate::http::Request;
use crate::operation::{Operation, ValidationPolicy};
use crate::params::ParameterStore;
use std::fmt;

/// Operation whose request is built by a closure
pub struct ClosureOperation<F> {
    name: String,
    build: F,
}

impl<F> ClosureOperation<F>
where
    F: FnMut(&ParameterStore) -> anyhow::Result<Request>,
{
    pub fn new(name: impl Into<String>, build: F) -> Self {
        Self {
            name: name.into(),
            build,
        }
    }
}

impl<F> Operation for ClosureOperation<F>
where
    F: FnMut(&ParameterStore) -> anyhow::Result<Request>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn validation(&self) -> ValidationPolicy {
        ValidationPolicy::SkipsDeclared
    }

    fn build(&mut self, params: &ParameterStore) -> anyhow::Result<Request> {
        (self.build)(params)
    }
}

impl<F> fmt::Debug for ClosureOperation<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureOperation")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F> Command<ClosureOperation<F>>
where
    F: FnMut(&ParameterStore) -> anyhow::Result<Request>,
{
    /// Create a command whose request is built by `build`
    pub fn closure(name: impl Into<String>, params: ParameterStore, build: F) -> Self {
        Command::new(ClosureOperation::new(name, build), params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandError;
    use crate::mock::MockClient;
    use std::sync::Arc;
    use svc_command_schema::{ArgDescriptor, ArgumentSchema};

    #[test]
    fn test_closure_builds_from_params() {
        let mut params = ParameterStore::new();
        params.set("path", "/status");

        let mut command = Command::closure("Status", params, |params: &ParameterStore| {
            let path = params.get_str("path").unwrap_or("/");
            Ok(Request::get(format!("https://api.example.com{}", path)))
        });

        assert_eq!(command.name(), "Status");
        let request = command.prepare(Some(Arc::new(MockClient::new()))).unwrap();
        assert_eq!(request.url(), "https://api.example.com/status");
    }

    #[test]
    fn test_closure_skips_schema_validation() {
        let id = ArgDescriptor::new("id").required();
        let schema = Arc::new(ArgumentSchema::new("Status").arg(id));
        let operation = ClosureOperation::new(
            "Status",
            |_: &ParameterStore| -> anyhow::Result<Request> {
                Ok(Request::get("https://api.example.com/"))
            },
        );
        let mut command = Command::with_schema(operation, ParameterStore::new(), schema);

        assert!(command.prepare(Some(Arc::new(MockClient::new()))).is_ok());
    }

    #[test]
    fn test_closure_build_error() {
        let mut command = Command::closure(
            "Broken",
            ParameterStore::new(),
            |_: &ParameterStore| -> anyhow::Result<Request> {
                anyhow::bail!("no endpoint configured")
            },
        );

        let client = Arc::new(MockClient::new());
        let err = command.prepare(Some(client)).unwrap_err();
        match err {
            CommandError::Build { operation, source } => {
                assert_eq!(operation, "Broken");
                assert_eq!(source.to_string(), "no endpoint configured");
            }
            other => panic!("expected build error, got {other:?}"),
        }
        assert!(!command.is_prepared());
    }
}
