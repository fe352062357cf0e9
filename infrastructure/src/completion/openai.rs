//! OpenAI-compatible chat completions client.
//!
//! Works against any endpoint speaking `POST {base_url}/chat/completions`
//! with function tools (OpenAI, Gemini's compatibility layer, local proxies).

use super::wire::{ChatRequest, ChatResponse, decode_response, encode_messages};
use crate::config::FileLlmConfig;
use crate::tools::JsonSchemaToolConverter;
use async_trait::async_trait;
use sql_agent_application::ports::tool_schema::ToolSchemaPort;
use sql_agent_application::{CompletionService, ServiceError, ToolChoice};
use sql_agent_domain::{InvocationId, Message, ToolDefinition};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Connection settings for [`OpenAiCompletionService`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL without the `/chat/completions` suffix.
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: None,
            temperature: 0.7,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Settings from the `[llm]` section, resolving the API key from the environment.
    pub fn from_file_config(config: &FileLlmConfig) -> Self {
        let mut settings = Self::new(&config.base_url, &config.model)
            .with_temperature(config.temperature)
            .with_timeout(Duration::from_secs(config.timeout_secs));
        settings.api_key = config.resolve_api_key();
        settings
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// [`CompletionService`] over an OpenAI-compatible HTTP endpoint.
pub struct OpenAiCompletionService {
    client: reqwest::Client,
    config: OpenAiConfig,
    converter: JsonSchemaToolConverter,
    fallback_ids: AtomicUsize,
}

impl OpenAiCompletionService {
    pub fn new(config: OpenAiConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServiceError::Other(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, config))
    }

    /// Use a preconfigured client (proxies, test servers).
    pub fn with_client(client: reqwest::Client, config: OpenAiConfig) -> Self {
        if config.api_key.is_none() {
            warn!(
                "No API key configured for {}; requests will be sent unauthenticated",
                config.base_url
            );
        }
        Self {
            client,
            config,
            converter: JsonSchemaToolConverter,
            fallback_ids: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn next_fallback_id(&self, tool: &str) -> InvocationId {
        let n = self.fallback_ids.fetch_add(1, Ordering::Relaxed);
        InvocationId::new(format!("call_{}_{}", tool, n))
    }
}

fn request_error(e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout
    } else if e.is_connect() {
        ServiceError::Connection(e.to_string())
    } else {
        ServiceError::Other(e.to_string())
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletionService {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        choice: ToolChoice,
    ) -> Result<Message, ServiceError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: encode_messages(messages),
            temperature: self.config.temperature,
            tools: self.converter.tools_schema(tools),
            tool_choice: (!tools.is_empty()).then(|| choice.as_str()),
        };

        debug!(
            "POST {} model={} messages={} tools={}",
            self.config.endpoint(),
            self.config.model,
            body.messages.len(),
            body.tools.len()
        );
        let start = Instant::now();

        let mut request = self.client.post(self.config.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await.map_err(request_error)?;

        let status = response.status();
        let text = response.text().await.map_err(request_error)?;
        debug!(
            "Completion returned {} in {}ms",
            status,
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            return Err(match status.as_u16() {
                401 | 403 => ServiceError::Auth(text),
                code => ServiceError::Http { status: code, body: text },
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            ServiceError::InvalidResponse(format!(
                "{}: {}",
                e,
                sql_agent_domain::util::preview(&text, 200)
            ))
        })?;

        decode_response(parsed, |tool| self.next_fallback_id(tool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use sql_agent_domain::ToolParameter;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serves one HTTP response and hands back the raw request it received.
    async fn serve_once(
        status: &'static str,
        body: Value,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            // Read until the declared body length has arrived.
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&received);
                if let Some((head, rest)) = text.split_once("\r\n\r\n") {
                    let length = head
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if rest.len() >= length {
                        break;
                    }
                }
            }
            let payload = body.to_string();
            let head = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                payload.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(payload.as_bytes()).await.unwrap();
            let _ = tx.send(String::from_utf8_lossy(&received).into_owned());
        });
        (format!("http://{}/v1", addr), rx)
    }

    fn service(base_url: &str) -> OpenAiCompletionService {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        OpenAiCompletionService::with_client(
            client,
            OpenAiConfig::new(base_url, "test-model")
                .with_api_key("secret")
                .with_temperature(0.0),
        )
    }

    fn request_body(raw: &str) -> Value {
        let (_, body) = raw.split_once("\r\n\r\n").unwrap();
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_config_trims_trailing_slash() {
        let config = OpenAiConfig::new("https://api.example.com/v1/", "m");
        assert_eq!(config.endpoint(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn test_from_file_config() {
        let file = FileLlmConfig {
            base_url: "http://localhost:8080".to_string(),
            model: "local".to_string(),
            api_key: Some("k".to_string()),
            temperature: 0.2,
            timeout_secs: 5,
            ..Default::default()
        };
        let config = OpenAiConfig::from_file_config(&file);
        assert_eq!(config.model, "local");
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.temperature, 0.2);
    }

    #[tokio::test]
    async fn test_generate_sends_tools_and_parses_call() {
        let (url, received) = serve_once(
            "200 OK",
            json!({"choices": [{"message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_abc",
                    "type": "function",
                    "function": {"name": "get_schema", "arguments": "{\"table_names\":\"Invoice\"}"}
                }]
            }}]}),
        )
        .await;

        let tool = ToolDefinition::new("get_schema", "Describe tables")
            .with_parameter(ToolParameter::new("table_names", "Tables", true));
        let reply = service(&url)
            .generate(&[Message::user("q")], &[tool], ToolChoice::Required)
            .await
            .unwrap();

        assert_eq!(reply.invocations()[0].id, InvocationId::new("call_abc"));
        assert_eq!(reply.invocations()[0].get_string("table_names"), Some("Invoice"));

        let raw = received.await.unwrap();
        assert!(raw.starts_with("POST /v1/chat/completions"));
        assert!(raw.to_ascii_lowercase().contains("authorization: bearer secret"));
        let body = request_body(&raw);
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["tool_choice"], "required");
        assert_eq!(body["tools"][0]["function"]["name"], "get_schema");
        assert_eq!(body["messages"][0], json!({"role": "user", "content": "q"}));
    }

    #[tokio::test]
    async fn test_generate_without_tools_omits_tool_choice() {
        let (url, received) = serve_once(
            "200 OK",
            json!({"choices": [{"message": {"role": "assistant", "content": "Jane Peacock"}}]}),
        )
        .await;

        let reply = service(&url)
            .generate(&[Message::user("q")], &[], ToolChoice::Auto)
            .await
            .unwrap();

        assert_eq!(reply, Message::assistant("Jane Peacock"));
        let body = request_body(&received.await.unwrap());
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
    }

    #[tokio::test]
    async fn test_without_key_sends_no_authorization() {
        let (url, received) = serve_once(
            "200 OK",
            json!({"choices": [{"message": {"role": "assistant", "content": "ok"}}]}),
        )
        .await;
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let service =
            OpenAiCompletionService::with_client(client, OpenAiConfig::new(&url, "test-model"));
        assert!(service.config().api_key.is_none());

        service
            .generate(&[Message::user("q")], &[], ToolChoice::Auto)
            .await
            .unwrap();

        let raw = received.await.unwrap().to_ascii_lowercase();
        assert!(!raw.contains("authorization:"));
    }

    #[tokio::test]
    async fn test_auth_failure() {
        let (url, _rx) = serve_once("401 Unauthorized", json!({"error": "bad key"})).await;
        let err = service(&url)
            .generate(&[Message::user("q")], &[], ToolChoice::Auto)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Auth(body) if body.contains("bad key")));
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let (url, _rx) = serve_once("503 Service Unavailable", json!({"error": "busy"})).await;
        let err = service(&url)
            .generate(&[Message::user("q")], &[], ToolChoice::Auto)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Http { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = service(&format!("http://{}", addr))
            .generate(&[Message::user("q")], &[], ToolChoice::Auto)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Connection(_)));
    }
}
