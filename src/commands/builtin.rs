// Built-in command table

use super::Handler;
use crate::gateway::HandlerError;
use std::sync::Arc;

pub const BUILTIN_NAMES: &[&str] = &["echo", "reverse", "upper"];

/// Resolve a built-in command by name
pub fn builtin(name: &str) -> Option<Arc<dyn Handler>> {
    let handler: Arc<dyn Handler> = match name {
        "echo" => Arc::new(echo),
        "reverse" => Arc::new(reverse),
        "upper" => Arc::new(upper),
        _ => return None,
    };
    Some(handler)
}

#[allow(clippy::unused_async)]
async fn echo(input: Option<String>) -> Result<String, HandlerError> {
    Ok(input.unwrap_or_default())
}

#[allow(clippy::unused_async)]
async fn reverse(input: Option<String>) -> Result<String, HandlerError> {
    let input = require_input("reverse", input)?;
    Ok(input.chars().rev().collect())
}

#[allow(clippy::unused_async)]
async fn upper(input: Option<String>) -> Result<String, HandlerError> {
    let input = require_input("upper", input)?;
    Ok(input.to_uppercase())
}

fn require_input(name: &str, input: Option<String>) -> Result<String, HandlerError> {
    input.ok_or_else(|| {
        HandlerError::new("no input provided", format!("{name} requires a data-src header"))
    })
}
