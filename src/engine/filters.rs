//! Helper filters available to every override template.

use std::collections::HashMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tera::{Result, Value};

/// Register the helper library on a Tera instance.
pub(crate) fn register(tera: &mut tera::Tera) {
    tera.register_filter("to_yaml", to_yaml);
    tera.register_filter("indent", indent);
    tera.register_filter("nindent", nindent);
    tera.register_filter("quote", quote);
    tera.register_filter("squote", squote);
    tera.register_filter("b64enc", b64enc);
    tera.register_filter("b64dec", b64dec);
    tera.register_filter("required", required);
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn width(args: &HashMap<String, Value>, filter: &str) -> Result<usize> {
    args.get("width")
        .and_then(Value::as_u64)
        .map(|w| w as usize)
        .ok_or_else(|| tera::Error::msg(format!("{filter} filter expects a `width` argument")))
}

fn pad(text: &str, width: usize) -> String {
    let padding = " ".repeat(width);
    text.split('\n')
        .map(|line| format!("{padding}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize a value as YAML without the trailing newline.
pub(crate) fn to_yaml(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let yaml = serde_yaml::to_string(value)
        .map_err(|e| tera::Error::msg(format!("to_yaml failed: {e}")))?;
    Ok(Value::String(yaml.trim_end_matches('\n').to_string()))
}

/// Indent every line, the first included.
pub(crate) fn indent(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(pad(&as_text(value), width(args, "indent")?)))
}

/// Like `indent`, with a leading newline.
pub(crate) fn nindent(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(format!(
        "\n{}",
        pad(&as_text(value), width(args, "nindent")?)
    )))
}

pub(crate) fn quote(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let quoted = serde_json::to_string(&as_text(value))
        .map_err(|e| tera::Error::msg(format!("quote failed: {e}")))?;
    Ok(Value::String(quoted))
}

pub(crate) fn squote(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(format!("'{}'", as_text(value))))
}

pub(crate) fn b64enc(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(STANDARD.encode(as_text(value))))
}

pub(crate) fn b64dec(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let bytes = STANDARD
        .decode(as_text(value))
        .map_err(|e| tera::Error::msg(format!("b64dec failed: {e}")))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| tera::Error::msg(format!("b64dec produced invalid UTF-8: {e}")))?;
    Ok(Value::String(text))
}

/// Fail rendering when the value is null or an empty string.
pub(crate) fn required(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let missing = match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    };
    if missing {
        let message = args
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or("required value is missing");
        return Err(tera::Error::msg(message));
    }
    Ok(value.clone())
}
