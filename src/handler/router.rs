//! Request routing dispatch module
//!
//! `/` serves the status page, `/api/...` goes through the gateway router,
//! anything else is a plain 404.

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

const API_PREFIX: &str = "/api/";

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let response = route_request(&req, &state).await;

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            req.method().to_string(),
            req.uri().path().to_string(),
        );
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        entry.user_agent = header(&req, "user-agent").map(ToString::to_string);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn route_request<B>(req: &Request<B>, state: &AppState) -> Response<Full<Bytes>> {
    let is_head = match *req.method() {
        Method::GET => false,
        Method::HEAD => true,
        _ => {
            logger::log_warning(&format!("Method not allowed: {}", req.method()));
            return http::build_405_response();
        }
    };

    let path = req.uri().path();
    if path == "/" {
        let html = state.status.render(&state.router.stats().snapshot()).await;
        return http::build_html_response(StatusCode::OK, html, is_head);
    }
    if !path.starts_with(API_PREFIX) {
        return http::build_404_response();
    }

    let input = req
        .headers()
        .get("data-src")
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
    match state.router.dispatch(path, header(req, "api-key"), input).await {
        Ok(output) => http::build_html_response(StatusCode::OK, output, is_head),
        Err(err) => http::build_html_response(
            err.status(),
            err.body(state.router.expose_error_detail()),
            is_head,
        ),
    }
}

/// Header value as UTF-8; anything else counts as absent
fn header<'a, B>(req: &'a Request<B>, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}
