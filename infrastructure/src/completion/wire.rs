//! Chat completions wire format.
//!
//! The transcript keeps a corrected query as a separate request that amends
//! the draft's invocation id. The API expects every `tool_calls` entry to be
//! answered exactly once, so the encoder folds each correction back into the
//! request it amends before sending.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use sql_agent_application::ServiceError;
use sql_agent_domain::{InvocationId, Message, ToolInvocation};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<Value>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseMessage {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireToolCall {
    #[serde(default)]
    pub id: String,
    pub function: WireFunction,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireFunction {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

/// Encode the transcript as chat `messages`.
pub(crate) fn encode_messages(messages: &[Message]) -> Vec<Value> {
    let (corrections, folded) = pair_corrections(messages);
    let mut encoded = Vec::with_capacity(messages.len());

    for (index, message) in messages.iter().enumerate() {
        match message {
            Message::System { content } => encoded.push(json!({"role": "system", "content": content})),
            Message::User { content } => encoded.push(json!({"role": "user", "content": content})),
            Message::Assistant { content } => {
                encoded.push(json!({"role": "assistant", "content": content}))
            }
            Message::ToolRequest {
                content,
                invocations,
                ..
            } => {
                if folded.contains(&index) {
                    continue;
                }
                let calls: Vec<Value> = invocations
                    .iter()
                    .map(|inv| {
                        let call = corrections.get(&(index, &inv.id)).copied().unwrap_or(inv);
                        encode_call(call)
                    })
                    .collect();
                let content = if content.is_empty() {
                    Value::Null
                } else {
                    Value::String(content.clone())
                };
                encoded.push(json!({
                    "role": "assistant",
                    "content": content,
                    "tool_calls": calls,
                }));
            }
            Message::ToolOutput {
                invocation_id,
                content,
                ..
            } => encoded.push(json!({
                "role": "tool",
                "tool_call_id": invocation_id.as_str(),
                "content": content,
            })),
        }
    }

    encoded
}

/// Latest correction per (draft message index, invocation id), and the
/// indices of the correction messages folded into their drafts.
///
/// A correction amends the nearest earlier request whose call with that id
/// has no tool output yet, so ids reused across turns stay apart.
fn pair_corrections(
    messages: &[Message],
) -> (
    HashMap<(usize, &InvocationId), &ToolInvocation>,
    HashSet<usize>,
) {
    let mut open: HashMap<&InvocationId, usize> = HashMap::new();
    let mut corrections = HashMap::new();
    let mut folded = HashSet::new();

    for (index, message) in messages.iter().enumerate() {
        match message {
            Message::ToolRequest {
                invocations,
                amends,
                ..
            } => {
                if let Some(id) = amends
                    && let Some(&draft) = open.get(id)
                    && let Some(corrected) = invocations.iter().find(|inv| &inv.id == id)
                {
                    corrections.insert((draft, id), corrected);
                    folded.insert(index);
                    continue;
                }
                for invocation in invocations {
                    open.insert(&invocation.id, index);
                }
            }
            Message::ToolOutput { invocation_id, .. } => {
                open.remove(invocation_id);
            }
            _ => {}
        }
    }

    (corrections, folded)
}

fn encode_call(invocation: &ToolInvocation) -> Value {
    let arguments: Map<String, Value> = invocation
        .arguments
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    json!({
        "id": invocation.id.as_str(),
        "type": "function",
        "function": {
            "name": invocation.tool_name,
            "arguments": Value::Object(arguments).to_string(),
        }
    })
}

/// Decode the first choice of a response into a transcript message.
///
/// `fallback_id` names calls the endpoint returned without an id.
pub(crate) fn decode_response(
    response: ChatResponse,
    mut fallback_id: impl FnMut(&str) -> InvocationId,
) -> Result<Message, ServiceError> {
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| ServiceError::InvalidResponse("response has no choices".to_string()))?;

    let calls = message.tool_calls.unwrap_or_default();
    if calls.is_empty() {
        return match message.content {
            Some(content) if !content.trim().is_empty() => Ok(Message::assistant(content)),
            _ => Err(ServiceError::InvalidResponse(
                "response has neither content nor tool calls".to_string(),
            )),
        };
    }

    let invocations = calls
        .into_iter()
        .map(|call| {
            let id = if call.id.is_empty() {
                fallback_id(&call.function.name)
            } else {
                InvocationId::new(call.id)
            };
            let arguments = decode_arguments(&call.function.name, &call.function.arguments)?;
            Ok(ToolInvocation {
                id,
                tool_name: call.function.name,
                arguments,
            })
        })
        .collect::<Result<Vec<_>, ServiceError>>()?;

    Ok(Message::ToolRequest {
        content: message.content.unwrap_or_default(),
        invocations,
        amends: None,
    })
}

fn decode_arguments(tool: &str, raw: &str) -> Result<BTreeMap<String, Value>, ServiceError> {
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map.into_iter().collect()),
        Ok(Value::Null) => Ok(BTreeMap::new()),
        Ok(other) => Err(ServiceError::InvalidResponse(format!(
            "arguments for {} are not an object: {}",
            tool, other
        ))),
        Err(e) => Err(ServiceError::InvalidResponse(format!(
            "arguments for {} are not valid JSON: {}",
            tool, e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sql_agent_domain::{ToolError, ToolResult};

    fn draft(id: &str, sql: &str) -> Message {
        Message::tool_request(vec![
            ToolInvocation::new(id, "run_query").with_arg("query", sql),
        ])
    }

    fn response(json: Value) -> ChatResponse {
        serde_json::from_value(json).unwrap()
    }

    fn no_fallback(_: &str) -> InvocationId {
        panic!("fallback id not expected")
    }

    #[test]
    fn test_encodes_roles() {
        let call = ToolInvocation::new("c1", "get_schema").with_arg("table_names", "Invoice");
        let messages = vec![
            Message::system("be careful"),
            Message::user("question"),
            Message::tool_request(vec![call.clone()]),
            Message::tool_output(&call, &ToolResult::success("get_schema", "CREATE TABLE")),
            Message::assistant("answer"),
        ];

        let wire = encode_messages(&messages);

        assert_eq!(wire.len(), 5);
        assert_eq!(wire[0]["role"], "system");
        assert_eq!(wire[1], json!({"role": "user", "content": "question"}));
        assert_eq!(wire[2]["role"], "assistant");
        assert!(wire[2]["content"].is_null());
        assert_eq!(wire[2]["tool_calls"][0]["id"], "c1");
        assert_eq!(wire[2]["tool_calls"][0]["type"], "function");
        assert_eq!(wire[2]["tool_calls"][0]["function"]["name"], "get_schema");
        let args: Value =
            serde_json::from_str(wire[2]["tool_calls"][0]["function"]["arguments"].as_str().unwrap())
                .unwrap();
        assert_eq!(args, json!({"table_names": "Invoice"}));
        assert_eq!(
            wire[3],
            json!({"role": "tool", "tool_call_id": "c1", "content": "CREATE TABLE"})
        );
        assert_eq!(wire[4]["content"], "answer");
    }

    #[test]
    fn test_correction_is_folded_into_draft() {
        let pending = InvocationId::new("draft");
        let corrected = ToolInvocation::new("check", "run_query").with_arg("query", "SELECT 2");
        let correction = Message::correction(&pending, corrected);
        let resolved = correction.invocations()[0].clone();
        let messages = vec![
            Message::user("q"),
            draft("draft", "SELECT 1"),
            correction,
            Message::tool_output(&resolved, &ToolResult::success("run_query", "[(2,)]")),
        ];

        let wire = encode_messages(&messages);

        assert_eq!(wire.len(), 3);
        let calls = wire[1]["tool_calls"].as_array().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["id"], "draft");
        assert!(calls[0]["function"]["arguments"]
            .as_str()
            .unwrap()
            .contains("SELECT 2"));
        assert_eq!(wire[2]["tool_call_id"], "draft");
    }

    #[test]
    fn test_reused_ids_fold_into_their_own_turn() {
        let pending = InvocationId::new("call_0");
        let mut messages = vec![Message::user("q")];
        for sql in ["SELECT 1", "SELECT 2"] {
            let checked = format!("{} -- checked", sql);
            let correction = Message::correction(
                &pending,
                ToolInvocation::new("chk", "run_query").with_arg("query", checked),
            );
            let resolved = correction.invocations()[0].clone();
            messages.push(draft("call_0", sql));
            messages.push(correction);
            messages.push(Message::tool_output(
                &resolved,
                &ToolResult::success("run_query", "[(1,)]"),
            ));
        }

        let wire = encode_messages(&messages);

        let roles: Vec<&str> = wire.iter().map(|m| m["role"].as_str().unwrap()).collect();
        assert_eq!(roles, vec!["user", "assistant", "tool", "assistant", "tool"]);
        let sql = |turn: usize| {
            let args = wire[turn]["tool_calls"][0]["function"]["arguments"]
                .as_str()
                .unwrap()
                .to_string();
            serde_json::from_str::<Value>(&args).unwrap()["query"].clone()
        };
        assert_eq!(sql(1), "SELECT 1 -- checked");
        assert_eq!(sql(3), "SELECT 2 -- checked");
    }

    #[test]
    fn test_two_corrections_fold_into_one_request() {
        let request = Message::tool_request(vec![
            ToolInvocation::new("d1", "run_query").with_arg("query", "SELECT 1"),
            ToolInvocation::new("d2", "run_query").with_arg("query", "SELECT 2"),
        ]);
        let first = Message::correction(
            &InvocationId::new("d1"),
            ToolInvocation::new("x", "run_query").with_arg("query", "SELECT 10"),
        );
        let second = Message::correction(
            &InvocationId::new("d2"),
            ToolInvocation::new("y", "run_query").with_arg("query", "SELECT 20"),
        );

        let wire = encode_messages(&[Message::user("q"), request, first, second]);

        assert_eq!(wire.len(), 2);
        let calls = wire[1]["tool_calls"].as_array().unwrap();
        assert_eq!(calls[0]["id"], "d1");
        assert!(calls[0]["function"]["arguments"].as_str().unwrap().contains("SELECT 10"));
        assert_eq!(calls[1]["id"], "d2");
        assert!(calls[1]["function"]["arguments"].as_str().unwrap().contains("SELECT 20"));
    }

    #[test]
    fn test_unmatched_correction_is_sent_as_is() {
        let correction = Message::correction(
            &InvocationId::new("ghost"),
            ToolInvocation::new("x", "run_query").with_arg("query", "SELECT 3"),
        );

        let wire = encode_messages(&[Message::user("q"), correction]);

        assert_eq!(wire.len(), 2);
        assert_eq!(wire[1]["tool_calls"][0]["id"], "ghost");
    }

    #[test]
    fn test_decode_text_answer() {
        let msg = decode_response(
            response(json!({"choices": [{"message": {"role": "assistant", "content": "Jane"}}]})),
            no_fallback,
        )
        .unwrap();
        assert_eq!(msg, Message::assistant("Jane"));
    }

    #[test]
    fn test_decode_tool_calls() {
        let msg = decode_response(
            response(json!({"choices": [{"message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "run_query", "arguments": "{\"query\": \"SELECT 1\"}"}
                }]
            }}]})),
            no_fallback,
        )
        .unwrap();

        let invocations = msg.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].id, InvocationId::new("call_1"));
        assert_eq!(invocations[0].get_string("query"), Some("SELECT 1"));
        assert_eq!(msg.text(), "");
    }

    #[test]
    fn test_decode_missing_id_uses_fallback() {
        let msg = decode_response(
            response(json!({"choices": [{"message": {
                "tool_calls": [{"function": {"name": "list_tables", "arguments": ""}}]
            }}]})),
            |name| InvocationId::synthetic(name, 7),
        )
        .unwrap();

        assert_eq!(msg.invocations()[0].id, InvocationId::new("list_tables_7"));
        assert!(msg.invocations()[0].arguments.is_empty());
    }

    #[test]
    fn test_decode_rejects_bad_arguments() {
        let err = decode_response(
            response(json!({"choices": [{"message": {
                "tool_calls": [{"id": "c", "function": {"name": "run_query", "arguments": "{not json"}}]
            }}]})),
            no_fallback,
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidResponse(m) if m.contains("run_query")));

        let err = decode_response(
            response(json!({"choices": [{"message": {
                "tool_calls": [{"id": "c", "function": {"name": "run_query", "arguments": "[1]"}}]
            }}]})),
            no_fallback,
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidResponse(_)));
    }

    #[test]
    fn test_decode_empty_response() {
        let err = decode_response(response(json!({"choices": []})), no_fallback).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidResponse(_)));

        let err = decode_response(
            response(json!({"choices": [{"message": {"content": "  "}}]})),
            no_fallback,
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidResponse(_)));
    }

    #[test]
    fn test_failed_output_encoded_as_tool_content() {
        let call = ToolInvocation::new("c9", "run_query").with_arg("query", "SELECT");
        let output = Message::tool_output(
            &call,
            &ToolResult::failure("run_query", ToolError::query_failed("syntax error")),
        );
        let wire = encode_messages(&[output]);
        assert_eq!(wire[0]["content"], "Error: syntax error");
    }
}
