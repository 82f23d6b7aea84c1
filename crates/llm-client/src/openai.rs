//! OpenAI / Azure OpenAI client over async-openai.

use std::sync::Arc;

use anyhow::Result;
use async_openai::config::{AzureConfig, Config, OpenAIConfig};
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs, ChatCompletionTool,
    ChatCompletionToolArgs, ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionCall,
    FunctionObjectArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use prompt::{ChatMessage, MessageRole, ToolCall, ToolSpec};
use tracing::{debug, info, instrument};

use crate::{mask_token, AssistantTurn, CompletionRequest, EnvLlmConfig, LlmClient, LlmError};

/// Chat client for any async-openai backend (`OpenAIConfig` or `AzureConfig`).
#[derive(Clone)]
pub struct OpenAIChatClient<C: Config> {
    client: Arc<Client<C>>,
    /// Model for OpenAI, deployment for Azure.
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_key_for_logging: Option<String>,
}

impl<C: Config> OpenAIChatClient<C> {
    pub fn with_config(config: C, model: impl Into<String>) -> Self {
        Self {
            client: Arc::new(Client::with_config(config)),
            model: model.into(),
            temperature: 0.0,
            max_tokens: crate::DEFAULT_MAX_TOKENS,
            api_key_for_logging: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn masked_key(&self) -> String {
        self.api_key_for_logging
            .as_deref()
            .map(mask_token)
            .unwrap_or_else(|| "***".to_string())
    }
}

impl OpenAIChatClient<OpenAIConfig> {
    /// OpenAI (or a compatible endpoint when `OPENAI_BASE_URL` is set).
    pub fn openai(config: &EnvLlmConfig) -> Result<Self, LlmError> {
        let key = config
            .openai_api_key
            .clone()
            .ok_or_else(|| LlmError::Config("OPENAI_API_KEY not set".to_string()))?;
        let mut openai = OpenAIConfig::new().with_api_key(key.clone());
        if let Some(base) = &config.openai_base_url {
            openai = openai.with_api_base(base);
        }
        let mut client = Self::with_config(openai, &config.llm_model)
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens);
        client.api_key_for_logging = Some(key);
        Ok(client)
    }
}

impl OpenAIChatClient<AzureConfig> {
    /// Azure OpenAI deployment.
    pub fn azure(config: &EnvLlmConfig) -> Result<Self, LlmError> {
        let key = config
            .azure_api_key
            .clone()
            .ok_or_else(|| LlmError::Config("AZURE_OPENAI_API_KEY not set".to_string()))?;
        let endpoint = config
            .azure_endpoint
            .clone()
            .ok_or_else(|| LlmError::Config("AZURE_OPENAI_ENDPOINT not set".to_string()))?;
        let azure = AzureConfig::new()
            .with_api_base(endpoint)
            .with_api_key(key.clone())
            .with_deployment_id(&config.azure_deployment)
            .with_api_version(&config.azure_api_version);
        let mut client = Self::with_config(azure, &config.azure_deployment)
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens);
        client.api_key_for_logging = Some(key);
        Ok(client)
    }
}

fn to_openai_message(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let content = msg.content.clone();
    let message: ChatCompletionRequestMessage = match msg.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::Assistant => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            if !content.is_empty() || msg.tool_calls.is_empty() {
                args.content(content);
            }
            if !msg.tool_calls.is_empty() {
                args.tool_calls(
                    msg.tool_calls
                        .iter()
                        .map(|c| ChatCompletionMessageToolCall {
                            id: c.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: c.name.clone(),
                                arguments: c.arguments.to_string(),
                            },
                        })
                        .collect::<Vec<_>>(),
                );
            }
            args.build()?.into()
        }
        MessageRole::Tool => ChatCompletionRequestToolMessageArgs::default()
            .content(content)
            .tool_call_id(msg.tool_call_id.clone().unwrap_or_default())
            .build()?
            .into(),
    };
    Ok(message)
}

fn to_openai_tool(spec: &ToolSpec) -> Result<ChatCompletionTool> {
    Ok(ChatCompletionToolArgs::default()
        .r#type(ChatCompletionToolType::Function)
        .function(
            FunctionObjectArgs::default()
                .name(&spec.name)
                .description(&spec.description)
                .parameters(spec.parameters.clone())
                .build()?,
        )
        .build()?)
}

#[async_trait]
impl<C> LlmClient for OpenAIChatClient<C>
where
    C: Config + Send + Sync + 'static,
{
    #[allow(deprecated)]
    #[instrument(skip(self, request), fields(model = %self.model, messages = request.messages.len(), tools = request.tools.len()))]
    async fn complete(&self, request: CompletionRequest) -> Result<AssistantTurn> {
        info!(
            model = %self.model,
            message_count = request.messages.len(),
            api_key = %self.masked_key(),
            "OpenAI chat_completion request"
        );

        let messages = request
            .messages
            .iter()
            .map(to_openai_message)
            .collect::<Result<Vec<_>>>()?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);
        if !request.tools.is_empty() {
            let tools = request
                .tools
                .iter()
                .map(to_openai_tool)
                .collect::<Result<Vec<_>>>()?;
            args.tools(tools);
        }
        let body = args.build()?;

        if let Ok(json) = serde_json::to_string(&body) {
            debug!(request_json = %json, "OpenAI chat_completion request JSON");
        }

        let response = self.client.chat().create(body).await?;

        if let Some(ref u) = response.usage {
            info!(
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                total_tokens = u.total_tokens,
                "OpenAI chat_completion usage"
            );
        }

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse("OpenAI"))?;
        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|c| {
                ToolCall::new(
                    c.id,
                    c.function.name,
                    crate::parse_arguments(&c.function.arguments),
                )
            })
            .collect();

        Ok(AssistantTurn {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assistant_tool_calls_are_converted() {
        let msg = ChatMessage::assistant_with_tools(
            "",
            vec![ToolCall::new("call_1", "multiply", json!({"a": 2, "b": 3}))],
        );
        let converted = to_openai_message(&msg).unwrap();
        let json = serde_json::to_value(&converted).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["tool_calls"][0]["id"], "call_1");
        assert_eq!(json["tool_calls"][0]["function"]["name"], "multiply");
    }

    #[test]
    fn test_tool_message_keeps_call_id() {
        let converted = to_openai_message(&ChatMessage::tool("call_1", "multiply", "6")).unwrap();
        let json = serde_json::to_value(&converted).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_1");
    }

    #[test]
    fn test_tool_spec_conversion() {
        let tool = to_openai_tool(&ToolSpec {
            name: "add".to_string(),
            description: "Add two numbers.".to_string(),
            parameters: json!({"type": "object", "properties": {}}),
        })
        .unwrap();
        assert_eq!(tool.function.name, "add");
    }

    #[test]
    fn test_azure_requires_endpoint() {
        let config = EnvLlmConfig {
            azure_api_key: Some("k".to_string()),
            ..EnvLlmConfig::default()
        };
        assert!(OpenAIChatClient::azure(&config).is_err());
    }
}
