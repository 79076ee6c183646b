//! Command dispatch
//!
//! Per request: count it, check the key, take the final path segment as the
//! command name, look it up, count the hit and run the handler. Every
//! failure comes back as a [`GatewayError`] for the HTTP layer to render.

use crate::gateway::{GatewayError, HandlerRegistry, KeyStore, Stats};
use crate::logger;
use std::sync::Arc;

pub struct Router {
    registry: HandlerRegistry,
    keys: KeyStore,
    stats: Arc<Stats>,
    expose_error_detail: bool,
}

impl Router {
    /// Stats are seeded with exactly the registered command names
    pub fn new(registry: HandlerRegistry, keys: KeyStore, expose_error_detail: bool) -> Self {
        let stats = Arc::new(Stats::new(registry.names()));
        Self {
            registry,
            keys,
            stats,
            expose_error_detail,
        }
    }

    pub fn stats(&self) -> &Arc<Stats> {
        &self.stats
    }

    pub const fn expose_error_detail(&self) -> bool {
        self.expose_error_detail
    }

    pub fn commands(&self) -> usize {
        self.registry.len()
    }

    pub fn has_commands(&self) -> bool {
        !self.registry.is_empty()
    }

    pub async fn dispatch(
        &self,
        path: &str,
        api_key: Option<&str>,
        input: Option<String>,
    ) -> Result<String, GatewayError> {
        self.stats.record_request();

        if !self.keys.is_authorized(api_key).await {
            return Err(GatewayError::Unauthorized);
        }

        let command = command_name(path);
        let handler = self
            .registry
            .lookup(command)
            .ok_or_else(|| GatewayError::UnknownCommand(command.to_string()))?;

        self.stats.record_hit(command);
        handler.run(input).await.map_err(|err| {
            logger::log_handler_failure(command, &err.message, &err.detail);
            GatewayError::HandlerFailure(err)
        })
    }
}

/// Everything after the last `/`; `/api/x/y/a` names `a`
pub fn command_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, last)| last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{builtin, Handler};
    use crate::gateway::keystore::{KeySource, KeysFuture};
    use crate::gateway::HandlerError;
    use hyper::StatusCode;

    struct StaticKeys(Vec<String>);

    impl KeySource for StaticKeys {
        fn fetch(&self) -> KeysFuture {
            let keys = self.0.clone();
            Box::pin(async move { Ok(keys) })
        }
    }

    #[allow(clippy::unused_async)]
    async fn explode(_input: Option<String>) -> Result<String, HandlerError> {
        Err(HandlerError::new("upstream refused", "explode.rs:12"))
    }

    fn router(expose: bool) -> Router {
        let handlers: Vec<(&str, Arc<dyn Handler>)> = vec![
            ("echo", builtin("echo").unwrap()),
            ("a", builtin("upper").unwrap()),
            ("explode", Arc::new(explode)),
        ];
        Router::new(
            HandlerRegistry::from_handlers(handlers),
            KeyStore::new(StaticKeys(vec!["k1".to_string()])),
            expose,
        )
    }

    fn hits(router: &Router, command: &str) -> u64 {
        router
            .stats()
            .snapshot()
            .cmds
            .into_iter()
            .find(|(name, _)| name == command)
            .map_or(0, |(_, n)| n)
    }

    #[test]
    fn test_command_name_takes_last_segment() {
        assert_eq!(command_name("/api/echo"), "echo");
        assert_eq!(command_name("/api/foo/bar"), "bar");
        assert_eq!(command_name("/api/bar"), "bar");
        assert_eq!(command_name("/api/"), "");
        assert_eq!(command_name("plain"), "plain");
    }

    #[tokio::test]
    async fn test_echo_scenario() {
        let router = router(true);

        let ok = router.dispatch("/api/echo", Some("k1"), Some("hello".into())).await;
        assert_eq!(ok.unwrap(), "hello");

        let denied = router.dispatch("/api/echo", Some("wrong"), Some("hello".into())).await;
        assert_eq!(denied.unwrap_err().status(), StatusCode::UNAUTHORIZED);

        let missing = router.dispatch("/api/missing", Some("k1"), None).await;
        assert_eq!(missing.unwrap_err().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unauthorized_regardless_of_path() {
        let router = router(true);
        for path in ["/api/echo", "/api/missing", "/api/x/y/a", "/api/"] {
            let err = router.dispatch(path, None, None).await.unwrap_err();
            assert!(matches!(err, GatewayError::Unauthorized), "{path}");
        }
        let snap = router.stats().snapshot();
        assert_eq!(snap.requests, 4);
        assert!(snap.cmds.iter().all(|(_, n)| *n == 0));
    }

    #[tokio::test]
    async fn test_nested_path_collapses_to_last_segment() {
        let router = router(true);
        let out = router.dispatch("/api/x/y/a", Some("k1"), Some("hi".into())).await;
        assert_eq!(out.unwrap(), "HI");
        assert_eq!(hits(&router, "a"), 1);
    }

    #[tokio::test]
    async fn test_counters() {
        let router = router(true);

        router.dispatch("/api/echo", Some("k1"), None).await.unwrap();
        router.dispatch("/api/echo", Some("k1"), None).await.unwrap();
        let _ = router.dispatch("/api/echo", Some("nope"), None).await;
        let _ = router.dispatch("/api/missing", Some("k1"), None).await;

        assert_eq!(router.stats().snapshot().requests, 4);
        assert_eq!(hits(&router, "echo"), 2);
    }

    #[tokio::test]
    async fn test_handler_failure_counts_hit() {
        let router = router(true);
        let err = router.dispatch("/api/explode", Some("k1"), None).await.unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body(router.expose_error_detail()), "upstream refused | explode.rs:12");
        assert_eq!(hits(&router, "explode"), 1);
    }

    #[tokio::test]
    async fn test_redacted_failure_body() {
        let router = router(false);
        let err = router.dispatch("/api/explode", Some("k1"), None).await.unwrap_err();
        assert_eq!(err.body(router.expose_error_detail()), "upstream refused");
    }
}
