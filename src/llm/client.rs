use async_trait::async_trait;
use log::{debug, info, warn};

use crate::config::AnalyzerConfig;
use crate::error::{BriefAnalyzerError, Result};
use crate::llm::prompts::{Brief, PromptBuilder};
use crate::llm::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::schema::AnalysisResult;

/// Raw HTTP outcome handed back by a transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The single outbound call the client needs. Implemented over `reqwest` for real
/// use and by scripted doubles in tests.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        bearer: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse>;
}

#[cfg(feature = "openai")]
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

#[cfg(feature = "openai")]
impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "openai")]
#[async_trait]
impl CompletionTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        bearer: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse> {
        let res = self
            .client
            .post(url)
            .bearer_auth(bearer)
            .json(body)
            .send()
            .await?;
        let status = res.status().as_u16();
        let body = res.text().await?;
        Ok(HttpResponse { status, body })
    }
}

fn status_error(status: u16, body: String) -> BriefAnalyzerError {
    match status {
        401 => BriefAnalyzerError::Unauthorized,
        _ => BriefAnalyzerError::HttpError { status, body },
    }
}

/// Pull the assistant text out of a chat-completion body.
fn extract_content(body: &str) -> Result<String> {
    let completion: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        BriefAnalyzerError::MalformedResponse(format!("completion body is not valid JSON: {}", e))
    })?;

    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            BriefAnalyzerError::MalformedResponse("completion has no message content".to_string())
        })
}

pub struct AnalysisClient<T> {
    transport: T,
    config: AnalyzerConfig,
    prompts: PromptBuilder,
}

#[cfg(feature = "openai")]
impl AnalysisClient<ReqwestTransport> {
    pub fn openai(config: AnalyzerConfig) -> Self {
        Self::new(ReqwestTransport::default(), config)
    }
}

impl<T: CompletionTransport> AnalysisClient<T> {
    pub fn new(transport: T, config: AnalyzerConfig) -> Self {
        Self {
            transport,
            config,
            prompts: PromptBuilder::new(),
        }
    }

    pub fn with_prompt_builder(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Validate the brief and credential, build the prompt and submit it.
    ///
    /// Both checks run before anything touches the network.
    pub async fn analyze(&self, brief_text: &str) -> Result<AnalysisResult> {
        let brief = Brief::new(brief_text)?;
        self.config.credential()?;
        let messages = self.prompts.build(&brief);
        self.submit(&messages).await
    }

    /// Send one completion request and validate the answer. No retries.
    pub async fn submit(&self, messages: &[ChatMessage]) -> Result<AnalysisResult> {
        let credential = self.config.credential()?;

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
        };
        let payload = serde_json::to_value(&request)?;

        info!(
            "Submitting brief analysis to {} (model {})",
            self.config.endpoint, self.config.model
        );

        let response = self
            .transport
            .post_json(&self.config.endpoint, credential, &payload)
            .await?;

        if !response.is_success() {
            warn!("Completion endpoint answered HTTP {}", response.status);
            return Err(status_error(response.status, response.body));
        }

        let content = extract_content(&response.body)?;
        debug!("Model returned {} bytes of content", content.len());

        let result = AnalysisResult::from_model_output(&content)?;
        info!(
            "Analysis received: {} questions, {} phases",
            result.clarification_questions.len(),
            result.project_structure.phases.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{completion_body, MINIMAL_RESULT};
    use futures::executor::block_on;
    use std::sync::Mutex;

    struct FixedTransport {
        response: HttpResponse,
        calls: Mutex<Vec<(String, String, serde_json::Value)>>,
    }

    impl FixedTransport {
        fn new(status: u16, body: impl Into<String>) -> Self {
            Self {
                response: HttpResponse {
                    status,
                    body: body.into(),
                },
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionTransport for FixedTransport {
        async fn post_json(
            &self,
            url: &str,
            bearer: &str,
            body: &serde_json::Value,
        ) -> Result<HttpResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), bearer.to_string(), body.clone()));
            Ok(self.response.clone())
        }
    }

    fn client(status: u16, body: impl Into<String>) -> AnalysisClient<FixedTransport> {
        AnalysisClient::new(
            FixedTransport::new(status, body),
            AnalyzerConfig::default().with_api_key("sk-test"),
        )
    }

    #[test]
    fn test_request_shape() {
        let client = client(200, completion_body(MINIMAL_RESULT));
        block_on(client.analyze("Build a todo app")).unwrap();

        let calls = client.transport.calls.lock().unwrap();
        let (url, bearer, body) = &calls[0];
        assert_eq!(url, crate::config::DEFAULT_ENDPOINT);
        assert_eq!(bearer, "sk-test");
        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(body["messages"][0]["role"], "system");
        assert!(body["temperature"].as_f64().unwrap() > 0.69);
    }

    #[test]
    fn test_401_is_unauthorized() {
        let client = client(401, r#"{"error":{"message":"bad key"}}"#);
        let err = block_on(client.analyze("brief")).unwrap_err();
        assert!(matches!(err, BriefAnalyzerError::Unauthorized));
    }

    #[test]
    fn test_other_status_is_http_error() {
        let client = client(500, "boom");
        let err = block_on(client.analyze("brief")).unwrap_err();
        assert!(matches!(err, BriefAnalyzerError::HttpError { status: 500, .. }));
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        let client = client(200, "<html>gateway</html>");
        let err = block_on(client.analyze("brief")).unwrap_err();
        assert!(matches!(err, BriefAnalyzerError::MalformedResponse(_)));
    }

    #[test]
    fn test_non_json_content_is_malformed() {
        let client = client(200, completion_body("Voici mon analyse : ..."));
        let err = block_on(client.analyze("brief")).unwrap_err();
        assert!(matches!(err, BriefAnalyzerError::MalformedResponse(_)));
    }

    #[test]
    fn test_missing_choices_is_malformed() {
        let client = client(200, r#"{"choices":[]}"#);
        let err = block_on(client.analyze("brief")).unwrap_err();
        assert!(matches!(err, BriefAnalyzerError::MalformedResponse(_)));
    }

    #[test]
    fn test_empty_brief_never_reaches_network() {
        let client = client(200, completion_body(MINIMAL_RESULT));
        let err = block_on(client.analyze("  ")).unwrap_err();
        assert!(matches!(err, BriefAnalyzerError::EmptyInput));
        assert_eq!(client.transport.call_count(), 0);
    }

    #[test]
    fn test_missing_credential_never_reaches_network() {
        let client = AnalysisClient::new(
            FixedTransport::new(200, completion_body(MINIMAL_RESULT)),
            AnalyzerConfig::default(),
        );
        let err = block_on(client.analyze("Build a todo app")).unwrap_err();
        assert!(matches!(err, BriefAnalyzerError::MissingCredential));
        assert_eq!(client.transport.call_count(), 0);
    }
}
