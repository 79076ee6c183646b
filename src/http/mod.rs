//! HTTP protocol layer module
//!
//! Response builders, decoupled from the gateway's dispatch logic.

pub mod response;

pub use response::{build_404_response, build_405_response, build_html_response};
