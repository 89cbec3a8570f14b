//! Tool-augmented response generation — stage two of the pipeline.
//!
//! A bounded protocol of exactly two model rounds:
//!
//! 1. Round 1 offers the full tool schema with automatic tool choice. A
//!    reply with no tool invocations is already the final answer.
//! 2. Otherwise every requested invocation is executed in order, each
//!    result appended as a tool message tagged with the originating call
//!    id, and round 2 (no tool schema) produces the final text.
//!
//! Everything that can go wrong inside the stage — either round, argument
//! parsing, tool execution — is caught at the top and replaced with a
//! fixed apologetic fallback. The topical restriction to Tokyo is enforced
//! by instruction, not code: the model is told to answer any other
//! location with a fixed refusal string.

use std::sync::Arc;
use tracing::{debug, warn};

use annai_core::error::{Error, ToolError};
use annai_core::message::Message;
use annai_core::provider::{ChatRequest, Provider};
use annai_core::tool::{ToolCall, ToolRegistry};

use crate::intent::intent_hint;
use crate::state::ConversationState;

/// What the user sees when the stage fails internally.
pub const FALLBACK_RESPONSE: &str =
    "I'm sorry, I'm having trouble processing your request right now.";

/// The literal result handed to the model when it invents a tool name.
const UNKNOWN_FUNCTION: &str = "Unknown function";

/// Drives the two-round tool protocol.
pub struct Responder {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    model: String,
    max_tokens: Option<u32>,
}

impl Responder {
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            tools,
            model: model.into(),
            max_tokens: None,
        }
    }

    /// Cap the length of model replies.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    fn system_prompt(intent: &str) -> String {
        format!(
            "You are a Tokyo travel assistant. You EXCLUSIVELY provide information about Tokyo, Japan. NO OTHER CITIES ALLOWED.\n\
             \n\
             {}\n\
             \n\
             If user asks about ANY other location = Respond: \"I can only help you with Tokyo information.\"\n\
             Use your tools to find answers to the user's question.\n\
             In case of not finding relevant information after using your tools, specify that the response includes information from your own knowledge.\n",
            intent_hint(intent)
        )
    }

    /// Produce `final_response` for the current turn.
    ///
    /// Never fails: any internal error is logged and replaced with
    /// [`FALLBACK_RESPONSE`].
    pub async fn respond(&self, state: &mut ConversationState) {
        state.final_response = match self.run_rounds(state).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Responder failed, returning fallback");
                FALLBACK_RESPONSE.to_string()
            }
        };
    }

    async fn run_rounds(&self, state: &ConversationState) -> Result<String, Error> {
        // System prompt with intent hint, prior history, current input.
        let mut messages = Vec::with_capacity(state.history.len() + 2);
        messages.push(Message::system(Self::system_prompt(&state.intent)));
        messages.extend(state.history.iter().cloned());
        messages.push(Message::user(&state.user_input));

        // Round 1: full tool schema, automatic tool choice.
        let mut request =
            ChatRequest::with_tools(&self.model, messages.clone(), self.tools.definitions());
        request.max_tokens = self.max_tokens;
        let response = self.provider.complete(request).await?;

        if response.message.tool_calls.is_empty() {
            // Direct answer — the protocol ends after one round.
            return Ok(response.message.content);
        }

        debug!(
            count = response.message.tool_calls.len(),
            "Executing requested tool invocations"
        );

        let tool_calls = response.message.tool_calls.clone();
        messages.push(response.message);

        // Execute invocations one after another; each result message must
        // carry the id of the call that produced it.
        for tc in &tool_calls {
            let arguments: serde_json::Value = serde_json::from_str(&tc.arguments)?;
            let call = ToolCall {
                id: tc.id.clone(),
                name: tc.name.clone(),
                arguments,
            };

            let output = match self.tools.execute(&call).await {
                Ok(result) => result.output,
                Err(ToolError::NotFound(name)) => {
                    warn!(tool = %name, "Model requested an unregistered tool");
                    UNKNOWN_FUNCTION.to_string()
                }
                Err(e) => return Err(e.into()),
            };

            messages.push(Message::tool_result(&tc.id, output));
        }

        // Round 2: no tool schema — the model turns results into an answer.
        let mut request = ChatRequest::plain(&self.model, messages);
        request.max_tokens = self.max_tokens;
        let response = self.provider.complete(request).await?;
        Ok(response.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annai_core::error::ProviderError;
    use annai_core::message::MessageToolCall;
    use annai_core::provider::ChatResponse;
    use annai_core::tool::{Tool, ToolResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// A provider that replays a scripted sequence of responses and
    /// records every request it sees.
    struct ScriptedProvider {
        script: Mutex<Vec<Result<ChatResponse, ProviderError>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<ChatResponse, ProviderError>>) -> Self {
            let mut script = script;
            script.reverse(); // pop() from the back
            Self {
                script: Mutex::new(script),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn text(content: &str) -> ChatResponse {
            ChatResponse {
                message: Message::assistant(content),
                usage: None,
                model: "mock-model".into(),
            }
        }

        fn tool_calls(calls: Vec<(&str, &str, &str)>) -> ChatResponse {
            let mut message = Message::assistant("");
            for (id, name, args) in calls {
                message.tool_calls.push(MessageToolCall {
                    id: id.into(),
                    name: name.into(),
                    arguments: args.into(),
                });
            }
            ChatResponse {
                message,
                usage: None,
                model: "mock-model".into(),
            }
        }

        fn request_log(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
            self.requests.lock().unwrap().push(request);
            self.script
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(ProviderError::Network("script exhausted".into())))
        }
    }

    struct StaticTool {
        name: &'static str,
        output: &'static str,
    }

    #[async_trait]
    impl Tool for StaticTool {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "static test tool"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object", "properties": {}})
        }
        async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
            Ok(ToolResult {
                call_id: String::new(),
                output: self.output.to_string(),
            })
        }
    }

    fn registry() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(StaticTool {
            name: "search_tokyo_info",
            output: "• Senso-ji Temple",
        }));
        registry.register(Box::new(StaticTool {
            name: "get_weather_info",
            output: "{\"current\": \"rain\"}",
        }));
        Arc::new(registry)
    }

    fn state(intent: &str, input: &str) -> ConversationState {
        let mut s = ConversationState::new(input, vec![]);
        s.intent = intent.into();
        s
    }

    #[tokio::test]
    async fn direct_answer_ends_after_one_round() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(ScriptedProvider::text(
            "Hello! How can I help you plan your Tokyo trip?",
        ))]));
        let responder = Responder::new(provider.clone(), registry(), "mock-model");

        let mut s = state("small_talk", "Hi there");
        responder.respond(&mut s).await;

        assert_eq!(
            s.final_response,
            "Hello! How can I help you plan your Tokyo trip?"
        );
        let log = provider.request_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].tools.len(), 2, "round 1 offers the tool schema");
    }

    #[tokio::test]
    async fn tool_round_feeds_results_into_round_two() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(ScriptedProvider::tool_calls(vec![
                ("call_1", "search_tokyo_info", "{\"query\":\"temples\"}"),
                ("call_2", "get_weather_info", "{\"location\":\"Tokyo\"}"),
            ])),
            Ok(ScriptedProvider::text(
                "Senso-ji is lovely; bring an umbrella tomorrow.",
            )),
        ]));
        let responder = Responder::new(provider.clone(), registry(), "mock-model");

        let mut s = state("mixed", "What temples are in Asakusa and will it rain tomorrow?");
        responder.respond(&mut s).await;

        assert_eq!(
            s.final_response,
            "Senso-ji is lovely; bring an umbrella tomorrow."
        );

        let log = provider.request_log();
        assert_eq!(log.len(), 2);
        assert!(log[1].tools.is_empty(), "round 2 must be schema-free");

        // Round 2 sees both tool results, each tagged with its call id.
        let round2 = &log[1].messages;
        let tool_msgs: Vec<_> = round2
            .iter()
            .filter(|m| m.tool_call_id.is_some())
            .collect();
        assert_eq!(tool_msgs.len(), 2);
        let ids: Vec<_> = tool_msgs
            .iter()
            .map(|m| m.tool_call_id.as_deref().unwrap())
            .collect();
        assert!(ids.contains(&"call_1") && ids.contains(&"call_2"));
    }

    #[tokio::test]
    async fn unknown_tool_yields_literal_placeholder() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(ScriptedProvider::tool_calls(vec![(
                "call_9",
                "book_flight",
                "{}",
            )])),
            Ok(ScriptedProvider::text("I can't book flights.")),
        ]));
        let responder = Responder::new(provider.clone(), registry(), "mock-model");

        let mut s = state("travel_info", "Book me a flight");
        responder.respond(&mut s).await;

        let log = provider.request_log();
        let tool_msg = log[1]
            .messages
            .iter()
            .find(|m| m.tool_call_id.as_deref() == Some("call_9"))
            .unwrap();
        assert_eq!(tool_msg.content, "Unknown function");
        assert_eq!(s.final_response, "I can't book flights.");
    }

    #[tokio::test]
    async fn round_one_failure_becomes_fallback() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(ProviderError::Network(
            "connection refused".into(),
        ))]));
        let responder = Responder::new(provider, registry(), "mock-model");

        let mut s = state("travel_info", "What temples are in Asakusa?");
        responder.respond(&mut s).await;

        assert_eq!(s.final_response, FALLBACK_RESPONSE);
    }

    #[tokio::test]
    async fn malformed_tool_arguments_become_fallback() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(
            ScriptedProvider::tool_calls(vec![("call_1", "search_tokyo_info", "not json")]),
        )]));
        let responder = Responder::new(provider, registry(), "mock-model");

        let mut s = state("travel_info", "temples?");
        responder.respond(&mut s).await;

        assert_eq!(s.final_response, FALLBACK_RESPONSE);
    }

    #[tokio::test]
    async fn system_prompt_carries_intent_hint_and_history() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(ScriptedProvider::text(
            "ok",
        ))]));
        let responder = Responder::new(provider.clone(), registry(), "mock-model");

        let mut s = ConversationState::new(
            "And the weather?",
            vec![
                Message::user("Tell me about Asakusa"),
                Message::assistant("Asakusa is known for Senso-ji."),
            ],
        );
        s.intent = "weather_info".into();
        responder.respond(&mut s).await;

        let log = provider.request_log();
        let msgs = &log[0].messages;
        assert!(msgs[0].content.contains("get_weather_info"), "hint injected");
        assert!(msgs[0].content.contains("I can only help you with Tokyo information."));
        assert_eq!(msgs.len(), 4); // system + 2 history + current input
        assert_eq!(msgs[3].content, "And the weather?");
    }
}
