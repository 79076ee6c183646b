//! Command handlers
//!
//! A handler is an async function from an optional input string to an
//! output string. Handlers come from the built-in table or from executables
//! found in the handler directory.

mod builtin;
mod script;

pub use builtin::{builtin, BUILTIN_NAMES};
pub use script::ScriptHandler;

use crate::gateway::HandlerError;
use std::future::Future;
use std::pin::Pin;

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<String, HandlerError>> + Send>>;

pub trait Handler: Send + Sync {
    fn run(&self, input: Option<String>) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Option<String>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, HandlerError>> + Send + 'static,
{
    fn run(&self, input: Option<String>) -> HandlerFuture {
        Box::pin(self(input))
    }
}
