use super::schema::{InputSchema, ValidatedInput};
use crate::content::{ContentEntry, ContentKey, ContentStore, MimeKind};
use crate::error::{AppError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Externally addressable view of one content entry.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    pub name: &'static str,
    pub uri: &'static str,
    pub description: &'static str,
    pub mime_kind: MimeKind,
    pub content_key: ContentKey,
}

impl ResourceDescriptor {
    pub fn new(
        name: &'static str,
        uri: &'static str,
        description: &'static str,
        content_key: ContentKey,
    ) -> Self {
        Self {
            name,
            uri,
            description,
            mime_kind: content_key.mime_kind(),
            content_key,
        }
    }
}

/// Result of a tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    /// Machine-readable companion to `text`, when the tool has one.
    pub structured: Option<Value>,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            structured: None,
        }
    }
}

/// Behavior behind a registered tool.
///
/// Handlers only ever see input that already passed the tool's schema.
pub trait ToolHandler: Send + Sync {
    /// Content entries the handler may read. Checked at registration.
    fn required_content(&self) -> &'static [ContentKey] {
        &[]
    }

    fn call(&self, input: &ValidatedInput, store: &ContentStore) -> Result<ToolOutput>;
}

#[derive(Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: InputSchema,
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}

/// Named resources and tools bound to one content store.
///
/// Built once at startup through `register_*`, then shared read-only.
pub struct CapabilityRegistry {
    store: Arc<ContentStore>,
    resources: Vec<ResourceDescriptor>,
    resource_index: HashMap<&'static str, usize>,
    tools: Vec<ToolDescriptor>,
    tool_index: HashMap<&'static str, usize>,
}

impl CapabilityRegistry {
    pub fn new(store: Arc<ContentStore>) -> Self {
        Self {
            store,
            resources: Vec::new(),
            resource_index: HashMap::new(),
            tools: Vec::new(),
            tool_index: HashMap::new(),
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn register_resource(&mut self, descriptor: ResourceDescriptor) -> Result<()> {
        if self.resource_index.contains_key(descriptor.uri) {
            return Err(AppError::ConfigurationError(format!(
                "resource '{}' already registered",
                descriptor.uri
            )));
        }
        if !self.store.contains(descriptor.content_key) {
            return Err(AppError::ConfigurationError(format!(
                "resource '{}' refers to missing content '{}'",
                descriptor.uri, descriptor.content_key
            )));
        }

        tracing::debug!(uri = descriptor.uri, key = %descriptor.content_key, "Resource registered");
        self.resource_index.insert(descriptor.uri, self.resources.len());
        self.resources.push(descriptor);
        Ok(())
    }

    pub fn register_tool(&mut self, descriptor: ToolDescriptor) -> Result<()> {
        if self.tool_index.contains_key(descriptor.name) {
            return Err(AppError::ConfigurationError(format!(
                "tool '{}' already registered",
                descriptor.name
            )));
        }
        if let Some(missing) = descriptor
            .handler
            .required_content()
            .iter()
            .find(|key| !self.store.contains(**key))
        {
            return Err(AppError::ConfigurationError(format!(
                "tool '{}' needs missing content '{}'",
                descriptor.name, missing
            )));
        }

        tracing::debug!(tool = descriptor.name, "Tool registered");
        self.tool_index.insert(descriptor.name, self.tools.len());
        self.tools.push(descriptor);
        Ok(())
    }

    pub fn resources(&self) -> &[ResourceDescriptor] {
        &self.resources
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn resource(&self, uri: &str) -> Option<&ResourceDescriptor> {
        self.resource_index.get(uri).map(|&i| &self.resources[i])
    }

    pub fn tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tool_index.get(name).map(|&i| &self.tools[i])
    }

    /// Content behind `uri`, exactly as loaded.
    pub fn resolve_resource(&self, uri: &str) -> Result<&ContentEntry> {
        let descriptor = self
            .resource(uri)
            .ok_or_else(|| AppError::NotFoundError(format!("resource '{}'", uri)))?;

        metrics::counter!("resource_reads_total", "uri" => descriptor.uri).increment(1);

        self.store
            .get(descriptor.content_key)
            .ok_or_else(|| AppError::NotFoundError(format!("content '{}'", descriptor.content_key)))
    }

    /// Validate `raw_input` against the tool's schema, then run its handler once.
    pub fn invoke_tool(&self, name: &str, raw_input: &Value) -> Result<ToolOutput> {
        let tool = self
            .tool(name)
            .ok_or_else(|| AppError::NotFoundError(format!("tool '{}'", name)))?;

        metrics::counter!("tool_calls_total", "tool" => tool.name).increment(1);

        let result = tool
            .input_schema
            .validate(raw_input)
            .and_then(|input| tool.handler.call(&input, &self.store));

        match &result {
            Ok(output) => {
                tracing::debug!(tool = tool.name, rendered_bytes = output.text.len(), "Tool call completed");
                metrics::histogram!("rendered_prompt_bytes", "tool" => tool.name)
                    .record(output.text.len() as f64);
            }
            Err(e) => {
                match e {
                    AppError::ValidationError { field, reason } => {
                        tracing::warn!(tool = tool.name, field = %field, reason = %reason, "Tool input rejected");
                    }
                    other => tracing::error!(tool = tool.name, error = %other, "Tool call failed"),
                }
                metrics::counter!("tool_errors_total", "tool" => tool.name, "kind" => e.kind())
                    .increment(1);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentSource;
    use crate::registry::schema::{FieldKind, FieldSpec};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Echo {
        calls: AtomicUsize,
    }

    impl ToolHandler for Echo {
        fn required_content(&self) -> &'static [ContentKey] {
            &[ContentKey::Overview]
        }

        fn call(&self, input: &ValidatedInput, store: &ContentStore) -> Result<ToolOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let text = input.get("text").and_then(Value::as_str).unwrap_or_default();
            Ok(ToolOutput::text(format!("{}:{}", store.body(ContentKey::Overview), text)))
        }
    }

    const ECHO_SCHEMA: InputSchema = InputSchema::new(&[FieldSpec::required(
        "text",
        "text",
        FieldKind::Text { non_empty: true },
    )]);

    fn small_store() -> Arc<ContentStore> {
        Arc::new(
            ContentStore::load([
                (ContentKey::Intro, ContentSource::Inline("hello".into())),
                (ContentKey::Overview, ContentSource::Inline("overview".into())),
            ])
            .unwrap(),
        )
    }

    fn echo_tool(handler: Arc<Echo>) -> ToolDescriptor {
        ToolDescriptor {
            name: "echo",
            description: "echo",
            input_schema: ECHO_SCHEMA,
            handler,
        }
    }

    #[test]
    fn test_resource_roundtrip() {
        let mut registry = CapabilityRegistry::new(small_store());
        registry
            .register_resource(ResourceDescriptor::new("intro", "nvc://intro", "intro", ContentKey::Intro))
            .unwrap();

        let entry = registry.resolve_resource("nvc://intro").unwrap();
        assert_eq!(entry.body, "hello");
        assert!(matches!(
            registry.resolve_resource("nvc://nope"),
            Err(AppError::NotFoundError(_))
        ));
    }

    #[test]
    fn test_duplicate_uri_rejected() {
        let mut registry = CapabilityRegistry::new(small_store());
        let d = ResourceDescriptor::new("intro", "nvc://intro", "intro", ContentKey::Intro);
        registry.register_resource(d.clone()).unwrap();
        assert!(matches!(
            registry.register_resource(d),
            Err(AppError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_unresolved_content_key_rejected() {
        let mut registry = CapabilityRegistry::new(small_store());
        let err = registry
            .register_resource(ResourceDescriptor::new("needs", "nvc://catalogs/needs", "needs", ContentKey::Needs))
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigurationError(_)));
        assert!(registry.resources().is_empty());
    }

    #[test]
    fn test_duplicate_tool_rejected() {
        let mut registry = CapabilityRegistry::new(small_store());
        let handler = Arc::new(Echo { calls: AtomicUsize::new(0) });
        registry.register_tool(echo_tool(handler.clone())).unwrap();
        assert!(matches!(
            registry.register_tool(echo_tool(handler)),
            Err(AppError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_tool_missing_content_rejected() {
        let store = Arc::new(
            ContentStore::load([(ContentKey::Intro, ContentSource::Inline("hello".into()))]).unwrap(),
        );
        let mut registry = CapabilityRegistry::new(store);
        let err = registry
            .register_tool(echo_tool(Arc::new(Echo { calls: AtomicUsize::new(0) })))
            .unwrap_err();
        assert!(err.to_string().contains("overview"));
    }

    #[test]
    fn test_invalid_input_never_reaches_handler() {
        let mut registry = CapabilityRegistry::new(small_store());
        let handler = Arc::new(Echo { calls: AtomicUsize::new(0) });
        registry.register_tool(echo_tool(handler.clone())).unwrap();

        let err = registry.invoke_tool("echo", &json!({"text": ""})).unwrap_err();
        assert!(matches!(err, AppError::ValidationError { ref field, .. } if field == "text"));
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);

        let out = registry.invoke_tool("echo", &json!({"text": "hi"})).unwrap();
        assert_eq!(out.text, "overview:hi");
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_tool() {
        let registry = CapabilityRegistry::new(small_store());
        assert!(matches!(
            registry.invoke_tool("missing", &json!({})),
            Err(AppError::NotFoundError(_))
        ));
    }
}
