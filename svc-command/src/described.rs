//! Schema-described operations
//!
//! Builds requests purely from an [`ArgumentSchema`]: its method, its URI
//! template, and the location of each argument.

use crate::command::Command;
use crate::http::Request;
use crate::operation::Operation;
use crate::params::ParameterStore;
use anyhow::{bail, Context};
use serde_json::{Map, Value};
use std::sync::Arc;
use svc_command_schema::{ArgumentSchema, Location};

/// Operation whose request is derived from its schema
#[derive(Debug, Clone)]
pub struct DescribedOperation {
    schema: Arc<ArgumentSchema>,
    base_url: String,
}

impl DescribedOperation {
    pub fn new(schema: Arc<ArgumentSchema>, base_url: impl Into<String>) -> Self {
        Self {
            schema,
            base_url: base_url.into(),
        }
    }

    pub fn schema(&self) -> &ArgumentSchema {
        &self.schema
    }

    fn url(&self, params: &ParameterStore) -> anyhow::Result<String> {
        let path = expand_template(self.schema.uri.as_deref().unwrap_or_default(), params)?;
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(path);
        }

        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path)
        })
    }
}

impl Operation for DescribedOperation {
    fn name(&self) -> &str {
        &self.schema.name
    }

    fn build(&mut self, params: &ParameterStore) -> anyhow::Result<Request> {
        let mut url = self.url(params)?;
        let mut headers = Vec::new();
        let mut body = Map::new();
        let mut query = Vec::new();

        for arg in &self.schema.args {
            let Some(value) = params.get(&arg.name).filter(|v| !v.is_null()) else {
                continue;
            };
            match arg.location {
                Some(Location::Query) => query.push(format!(
                    "{}={}",
                    urlencoding::encode(&arg.name),
                    urlencoding::encode(&value_string(value))
                )),
                Some(Location::Header) => headers.push((arg.name.as_str(), value_string(value))),
                Some(Location::Body) => {
                    body.insert(arg.name.clone(), value.clone());
                }
                Some(Location::Uri) | None => {}
            }
        }

        if !query.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query.join("&"));
        }

        let method = self.schema.method.as_deref().unwrap_or("GET");
        let mut request = Request::new(method, url);
        for (name, value) in headers {
            request.set_header(name, value);
        }
        if !body.is_empty() {
            let bytes = serde_json::to_vec(&body).context("failed to encode request body")?;
            request = request
                .with_header("Content-Type", "application/json")
                .with_body(bytes);
        }
        Ok(request)
    }
}

impl Command<DescribedOperation> {
    /// Create a command built and validated from a shared schema
    pub fn described(
        schema: Arc<ArgumentSchema>,
        base_url: impl Into<String>,
        params: ParameterStore,
    ) -> Self {
        let operation = DescribedOperation::new(Arc::clone(&schema), base_url);
        Command::with_schema(operation, params, schema)
    }
}

/// Substitute `{name}` placeholders with URL-encoded parameter values
fn expand_template(template: &str, params: &ParameterStore) -> anyhow::Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            bail!("unterminated placeholder in URI template '{}'", template);
        };

        let name = &after[..close];
        let value = params
            .get(name)
            .filter(|v| !v.is_null())
            .with_context(|| format!("missing value for URI placeholder '{{{}}}'", name))?;
        out.push_str(&urlencoding::encode(&value_string(value)));
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

fn value_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandError;
    use crate::mock::MockClient;
    use serde_json::json;
    use svc_command_schema::{ArgDescriptor, ArgType};

    fn get_user_schema() -> Arc<ArgumentSchema> {
        Arc::new(
            ArgumentSchema::new("GetUser")
                .method("GET")
                .uri("/users/{id}")
                .arg(ArgDescriptor::new("id").required().kind(ArgType::Integer))
                .arg(
                    ArgDescriptor::new("fields")
                        .location(Location::Query)
                        .default("all"),
                )
                .arg(ArgDescriptor::new("X-Trace").location(Location::Header)),
        )
    }

    #[test]
    fn test_expand_template() {
        let mut params = ParameterStore::new();
        params.set("bucket", "my photos");
        params.set("key", 7);

        assert_eq!(
            expand_template("/{bucket}/objects/{key}", &params).unwrap(),
            "/my%20photos/objects/7"
        );
        assert!(expand_template("/{missing}", &params).is_err());
        assert!(expand_template("/{bucket", &params).is_err());
    }

    #[test]
    fn test_described_request() {
        let mut params = ParameterStore::new();
        params.set("id", 42);
        params.set("X-Trace", "abc");

        let mut command =
            Command::described(get_user_schema(), "https://api.example.com/v1/", params);
        assert_eq!(command.name(), "GetUser");

        let request = command.prepare(Some(Arc::new(MockClient::new()))).unwrap();
        assert_eq!(request.method(), "GET");
        assert_eq!(
            request.url(),
            "https://api.example.com/v1/users/42?fields=all"
        );
        assert_eq!(request.headers().get("x-trace"), Some("abc"));
        assert!(request.body().is_none());
    }

    #[test]
    fn test_described_validation_runs_first() {
        let mut command = Command::described(
            get_user_schema(),
            "https://api.example.com",
            [("id", "forty-two")].into_iter().collect(),
        );

        let client = Arc::new(MockClient::new());
        let err = command.prepare(Some(client)).unwrap_err();
        assert!(matches!(err, CommandError::Validation(_)));
    }

    #[test]
    fn test_body_arguments() {
        let schema = Arc::new(
            ArgumentSchema::new("CreateUser")
                .method("post")
                .uri("/users")
                .arg(
                    ArgDescriptor::new("name")
                        .required()
                        .location(Location::Body),
                )
                .arg(ArgDescriptor::new("admin").location(Location::Body)),
        );

        let mut command = Command::described(
            schema,
            "https://api.example.com",
            [("name", json!("Ada")), ("admin", json!(true))]
                .into_iter()
                .collect(),
        );

        let request = command.prepare(Some(Arc::new(MockClient::new()))).unwrap();
        assert_eq!(request.method(), "POST");
        assert_eq!(request.url(), "https://api.example.com/users");
        let content_type = request.headers().get("Content-Type");
        assert_eq!(content_type, Some("application/json"));

        let body: Value = serde_json::from_slice(request.body().unwrap()).unwrap();
        assert_eq!(body, json!({ "name": "Ada", "admin": true }));
    }
}
