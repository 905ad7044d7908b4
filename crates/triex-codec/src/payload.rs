use serde_json::Value;
use triex_core::{Operation, Reply, Request, Result, TrieXError};

/// Encodes the request tuple as `[operation, argument]`.
pub fn encode_request(request: &Request) -> Vec<u8> {
    encode_raw(request.operation().name(), request.argument())
}

/// Encodes an arbitrary operation name, known or not.
pub fn encode_raw(operation: &str, argument: Option<&str>) -> Vec<u8> {
    Value::Array(vec![
        Value::from(operation),
        argument.map_or(Value::Null, Value::from),
    ])
    .to_string()
    .into_bytes()
}

/// Decodes a request payload.
///
/// Accepts `[op]`, `[op, null]` and `[op, "arg"]`. Anything else is
/// malformed; an unknown `op` is not, it selects the full dump.
pub fn decode_request(payload: &[u8]) -> Result<Request> {
    let text = std::str::from_utf8(payload)
        .map_err(|e| TrieXError::MalformedRequest(format!("payload is not UTF-8: {}", e)))?;
    let value: Value = serde_json::from_str(text)
        .map_err(|e| TrieXError::MalformedRequest(format!("payload is not a tuple: {}", e)))?;

    let (name, argument) = match value.as_array().map(Vec::as_slice) {
        Some([Value::String(name)]) | Some([Value::String(name), Value::Null]) => (name, None),
        Some([Value::String(name), Value::String(arg)]) => (name, Some(arg.clone())),
        _ => {
            return Err(TrieXError::MalformedRequest(
                "expected [operation, argument]".to_string(),
            ))
        }
    };

    Request::new(Operation::from_name(name), argument)
}

pub fn encode_reply(reply: &Reply) -> Vec<u8> {
    reply.to_string().into_bytes()
}

pub fn decode_reply(payload: &[u8]) -> Result<String> {
    String::from_utf8(payload.to_vec())
        .map_err(|e| TrieXError::ProtocolViolation(format!("response is not UTF-8: {}", e)))
}
