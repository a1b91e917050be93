//! Command lifecycle state machine
//!
//! A [`Command`] moves through `Configured → Prepared → Executed →
//! Materialized`. The request is built at most once, by [`Command::prepare`];
//! the result is computed at most once, on the first [`Command::result`]
//! call after the request completes.

use crate::client::{Client, Dispatch};
use crate::error::{CommandError, ValidationError};
use crate::http::{Headers, Request, Response};
use crate::materialize::CommandOutput;
use crate::operation::{Operation, ValidationPolicy};
use crate::params::ParameterStore;
use crate::validation::{validate_against_declared, validate_against_schema, Strictness};
use serde_json::Value;
use std::borrow::Cow;
use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;
use svc_command_schema::ArgumentSchema;

/// Observable lifecycle state of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    /// No request built yet
    Configured,
    /// Request built, not complete
    Prepared,
    /// Request complete, result not computed
    Executed,
    /// Result computed and cached
    Materialized,
}

/// A single remote operation and its lifecycle
pub struct Command<O> {
    operation: O,
    params: ParameterStore,
    schema: Option<Arc<ArgumentSchema>>,
    client: Option<Arc<dyn Client>>,
    request: Option<Request>,
    result: OnceCell<CommandOutput>,
    batchable: bool,
}

impl<O: Operation> Command<O> {
    /// Create a command validated against the operation's declared parameters
    pub fn new(operation: O, params: ParameterStore) -> Self {
        Self::configure(operation, params, None)
    }

    /// Create a command validated against a shared argument schema
    pub fn with_schema(operation: O, params: ParameterStore, schema: Arc<ArgumentSchema>) -> Self {
        Self::configure(operation, params, Some(schema))
    }

    fn configure(
        operation: O,
        params: ParameterStore,
        schema: Option<Arc<ArgumentSchema>>,
    ) -> Self {
        let mut command = Self {
            operation,
            params,
            schema,
            client: None,
            request: None,
            result: OnceCell::new(),
            batchable: true,
        };

        command.params.ensure_header_store();

        // Lenient passes only inject defaults
        if let Err(err) = command.validate(Strictness::Lenient) {
            tracing::debug!(
                command = %command.name(),
                error = %err,
                "Lenient validation reported violations"
            );
        }

        command.operation.init(&mut command.params);
        tracing::trace!(command = %command.name(), "Command configured");
        command
    }

    /// Set whether batching layers may group this command
    pub fn with_batching(mut self, batchable: bool) -> Self {
        self.batchable = batchable;
        self
    }

    /// Attach a client
    pub fn with_client(mut self, client: Arc<dyn Client>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn name(&self) -> &str {
        self.operation.name()
    }

    pub fn operation(&self) -> &O {
        &self.operation
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParameterStore {
        &mut self.params
    }

    /// Get a parameter
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Set a parameter.
    ///
    /// Changes after `prepare` do not affect the already-built request.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.params.set(key, value);
    }

    pub fn schema(&self) -> Option<&Arc<ArgumentSchema>> {
        self.schema.as_ref()
    }

    pub fn client(&self) -> Option<&Arc<dyn Client>> {
        self.client.as_ref()
    }

    pub fn set_client(&mut self, client: Arc<dyn Client>) {
        self.client = Some(client);
    }

    /// Whether batching layers may group this command. Pure metadata.
    pub fn can_batch(&self) -> bool {
        self.batchable
    }

    pub fn state(&self) -> CommandState {
        match &self.request {
            None => CommandState::Configured,
            Some(request) if !request.is_complete() => CommandState::Prepared,
            Some(_) if self.result.get().is_none() => CommandState::Executed,
            Some(_) => CommandState::Materialized,
        }
    }

    pub fn is_prepared(&self) -> bool {
        self.request.is_some()
    }

    pub fn is_executed(&self) -> bool {
        self.request.as_ref().is_some_and(Request::is_complete)
    }

    /// Build the request, once.
    ///
    /// Adopts `client` when none is attached yet. Later calls return the
    /// existing request without validating or building again.
    pub fn prepare(&mut self, client: Option<Arc<dyn Client>>) -> Result<&Request, CommandError> {
        self.prepare_mut(client).map(|request| &*request)
    }

    fn prepare_mut(
        &mut self,
        client: Option<Arc<dyn Client>>,
    ) -> Result<&mut Request, CommandError> {
        if self.request.is_none() {
            if self.client.is_none() {
                self.client = client;
            }
            if self.client.is_none() {
                return Err(CommandError::NoClient);
            }

            self.validate(Strictness::Strict)?;

            let mut request = self
                .operation
                .build(&self.params)
                .map_err(|source| CommandError::Build {
                    operation: self.operation.name().to_string(),
                    source,
                })?;

            if let Some(headers) = self.params.header_store() {
                for (name, value) in headers {
                    request.set_header(name.as_str(), header_value(value));
                }
            }

            tracing::debug!(
                command = %self.operation.name(),
                method = %request.method(),
                url = %request.url(),
                "Command prepared"
            );
            self.request = Some(request);
        }

        self.request.as_mut().ok_or(CommandError::NotPrepared)
    }

    /// Hand the command to its client.
    ///
    /// Not idempotent: every call dispatches again. Waiting for completion
    /// is the client's job.
    pub fn execute(&mut self) -> Result<&mut Self, CommandError> {
        let client = self.client.clone().ok_or(CommandError::NoClient)?;

        tracing::debug!(command = %self.name(), "Executing command");
        client.execute(self).map_err(|err| match err.downcast::<CommandError>() {
            Ok(command_err) => command_err,
            Err(other) => CommandError::Client(other),
        })?;

        Ok(self)
    }

    /// The built request
    pub fn request(&self) -> Result<&Request, CommandError> {
        self.request.as_ref().ok_or(CommandError::NotPrepared)
    }

    /// The response of the completed request
    pub fn response(&self) -> Result<&Response, CommandError> {
        self.request
            .as_ref()
            .and_then(Request::response)
            .ok_or(CommandError::NotExecuted)
    }

    /// The materialized result, computed on first access and cached
    pub fn result(&self) -> Result<&CommandOutput, CommandError> {
        let response = self.response()?;
        Ok(self.result.get_or_init(|| {
            tracing::debug!(
                command = %self.name(),
                status = response.status(),
                "Materializing result"
            );
            self.operation.process(response)
        }))
    }

    /// Add a header to send with the request.
    ///
    /// Headers set after `prepare` are stored but not applied to the
    /// already-built request.
    pub fn set_request_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.set_header(name, value);
    }

    /// The live request's headers once prepared, else the pending headers
    pub fn request_headers(&self) -> Cow<'_, Headers> {
        match &self.request {
            Some(request) => Cow::Borrowed(request.headers()),
            None => Cow::Owned(
                self.params
                    .header_store()
                    .map(|headers| {
                        headers
                            .iter()
                            .map(|(name, value)| (name.as_str(), header_value(value)))
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
        }
    }

    fn validate(&mut self, strictness: Strictness) -> Result<(), ValidationError> {
        if self.operation.validation() == ValidationPolicy::SkipsDeclared {
            return Ok(());
        }

        match &self.schema {
            Some(schema) => validate_against_schema(schema, &mut self.params, strictness),
            None => validate_against_declared(
                self.operation.declared_params(),
                &mut self.params,
                strictness,
            ),
        }
    }
}

impl<O: Operation> Dispatch for Command<O> {
    fn name(&self) -> &str {
        self.operation.name()
    }

    fn can_batch(&self) -> bool {
        self.batchable
    }

    fn is_prepared(&self) -> bool {
        self.request.is_some()
    }

    fn prepare_request(&mut self) -> Result<&mut Request, CommandError> {
        self.prepare_mut(None)
    }
}

impl<O: Operation> fmt::Debug for Command<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name())
            .field("state", &self.state())
            .field("params", &self.params)
            .field("has_schema", &self.schema.is_some())
            .field("has_client", &self.client.is_some())
            .field("batchable", &self.batchable)
            .finish()
    }
}

fn header_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockClient;
    use serde_json::json;
    use std::cell::Cell;
    use svc_command_schema::{ArgDescriptor, ParamDescriptor};

    /// Operation that counts hook invocations
    #[derive(Default)]
    struct FetchItem {
        builds: usize,
        processed: Cell<usize>,
    }

    impl Operation for FetchItem {
        fn name(&self) -> &str {
            "FetchItem"
        }

        fn declared_params(&self) -> &'static [ParamDescriptor] {
            const PARAMS: &[ParamDescriptor] = &[ParamDescriptor::required("id")];
            PARAMS
        }

        fn build(&mut self, params: &ParameterStore) -> anyhow::Result<Request> {
            self.builds += 1;
            Ok(Request::get(format!(
                "https://api.example.com/items/{}",
                params.get("id").map(header_value).unwrap_or_default()
            )))
        }

        fn process(&self, response: &Response) -> CommandOutput {
            self.processed.set(self.processed.get() + 1);
            crate::materialize::materialize(response)
        }
    }

    fn fetch_with_id() -> Command<FetchItem> {
        Command::new(FetchItem::default(), [("id", 1)].into_iter().collect())
    }

    #[test]
    fn test_prepare_builds_once() {
        let client = Arc::new(MockClient::new());
        let mut command = fetch_with_id();

        let first = command.prepare(Some(client)).unwrap().url().to_string();
        let second = command.prepare(None).unwrap().url().to_string();

        assert_eq!(first, second);
        assert_eq!(command.operation().builds, 1);
        assert_eq!(command.state(), CommandState::Prepared);
    }

    #[test]
    fn test_prepare_without_client_fails() {
        let mut command = fetch_with_id();
        assert!(matches!(command.prepare(None), Err(CommandError::NoClient)));
        assert!(!command.is_prepared());
        assert_eq!(command.operation().builds, 0);
    }

    #[test]
    fn test_declared_params_checked_at_prepare() {
        let mut command = Command::new(FetchItem::default(), ParameterStore::new());
        let client = Arc::new(MockClient::new());
        let err = command.prepare(Some(client)).unwrap_err();

        match err {
            CommandError::Validation(err) => assert_eq!(err.missing_arguments(), vec!["id"]),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(!command.is_prepared());

        command.set("id", 9);
        assert!(command.prepare(None).is_ok());
    }

    #[test]
    fn test_schema_takes_precedence_over_declared() {
        let id = ArgDescriptor::new("id").default(5);
        let schema = Arc::new(ArgumentSchema::new("FetchItem").arg(id));
        let mut command = Command::with_schema(FetchItem::default(), ParameterStore::new(), schema);

        // Construction injected the schema default
        assert_eq!(command.get("id"), Some(&json!(5)));
        let request = command.prepare(Some(Arc::new(MockClient::new()))).unwrap();
        assert_eq!(request.url(), "https://api.example.com/items/5");
    }

    #[test]
    fn test_state_progression_and_memoized_result() {
        let client = Arc::new(MockClient::new());
        client.push_response(Response::ok("text/xml", "<ok/>"));

        let mut command = fetch_with_id().with_client(client);
        assert_eq!(command.state(), CommandState::Configured);

        command.execute().unwrap();
        assert_eq!(command.state(), CommandState::Executed);
        assert_eq!(command.operation().processed.get(), 0);

        let first = command.result().unwrap() as *const CommandOutput;
        let second = command.result().unwrap() as *const CommandOutput;
        assert_eq!(first, second);
        assert_eq!(command.operation().processed.get(), 1);
        assert_eq!(command.state(), CommandState::Materialized);
    }

    #[test]
    fn test_request_headers_view_shifts_on_prepare() {
        let mut command = fetch_with_id();
        command.set_request_header("X-Foo", "bar");
        command.params_mut().set_header("X-Count", "1");

        let pending = command.request_headers();
        assert!(matches!(pending, Cow::Owned(_)));
        assert_eq!(pending.get("x-foo"), Some("bar"));

        command.prepare(Some(Arc::new(MockClient::new()))).unwrap();
        command.set_request_header("X-Late", "ignored");

        let live = command.request_headers();
        assert!(matches!(live, Cow::Borrowed(_)));
        assert_eq!(live.get("X-Foo"), Some("bar"));
        assert!(!live.contains("X-Late"));
        assert_eq!(command.params().header_store().unwrap().len(), 3);
    }

    #[test]
    fn test_non_string_header_values() {
        let mut params = ParameterStore::new();
        params.set("id", 1);
        params.set("headers", json!({ "X-Retry": 3, "X-Flag": true }));
        let mut command = Command::new(FetchItem::default(), params);

        let request = command.prepare(Some(Arc::new(MockClient::new()))).unwrap();
        let headers: Vec<(&str, &str)> = request.headers().iter().collect();
        assert_eq!(headers, vec![("X-Retry", "3"), ("X-Flag", "true")]);
    }

    #[test]
    fn test_debug_output() {
        let debug = format!("{:?}", fetch_with_id().with_batching(false));
        assert!(debug.contains("FetchItem"));
        assert!(debug.contains("Configured"));
        assert!(debug.contains("batchable: false"));
    }
}
