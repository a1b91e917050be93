//! # svc-command: command lifecycle core for HTTP service clients
//!
//! Models a single remote operation as a [`Command`] that moves through
//! well-defined states:
//!
//! - **Configured**: parameters collected, defaults injected
//! - **Prepared**: parameters strictly validated, request built
//! - **Executed**: the client received a response
//! - **Materialized**: the result value was computed and cached
//!
//! Transport, connection handling and batching are left to [`Client`]
//! implementations.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use svc_command::{Command, DeclaredParams, Operation, ParameterStore, Request};
//!
//! #[derive(DeclaredParams)]
//! #[param(name = "id", required, kind = "integer")]
//! struct GetUser;
//!
//! impl Operation for GetUser {
//!     fn name(&self) -> &str {
//!         "GetUser"
//!     }
//!
//!     fn declared_params(&self) -> &'static [svc_command::ParamDescriptor] {
//!         <Self as DeclaredParams>::PARAMS
//!     }
//!
//!     fn build(&mut self, params: &ParameterStore) -> anyhow::Result<Request> {
//!         let id = params.get("id").cloned().unwrap_or_default();
//!         Ok(Request::get(format!("https://api.example.com/users/{id}")))
//!     }
//! }
//!
//! let mut command = Command::new(GetUser, ParameterStore::new()).with_client(client);
//! command.set("id", 42);
//! command.execute()?;
//! let result = command.result()?;
//! ```

pub mod client;
pub mod closure;
pub mod command;
pub mod described;
pub mod error;
pub mod http;
pub mod materialize;
pub mod mock;
pub mod operation;
pub mod params;
pub mod tracing_support;
pub mod validation;
pub mod xml;

// Re-export the derive macro alongside the trait it implements
pub use svc_command_macros::DeclaredParams;

pub use svc_command_schema::{
    ArgDescriptor, ArgRule, ArgType, ArgumentSchema, DeclaredParams, Location, ParamDescriptor,
    SchemaError, ServiceDescription, StaticValue,
};

pub use client::{Client, Dispatch};
pub use closure::ClosureOperation;
pub use command::{Command, CommandState};
pub use described::DescribedOperation;
pub use error::{CommandError, ValidationError, Violation};
pub use http::{Headers, Request, RequestState, Response};
pub use materialize::{is_xml_content_type, materialize, CommandOutput};
pub use mock::MockClient;
pub use operation::{Operation, ValidationPolicy};
pub use params::{ParameterStore, HEADERS_KEY};
pub use validation::{validate_against_declared, validate_against_schema, Strictness};
pub use xml::{XmlDocument, XmlElement, XmlNode, XmlParseError};
