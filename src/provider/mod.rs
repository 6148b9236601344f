//! Remote provider plumbing
//!
//! Adapters own the connection-establishment policy; this module only
//! supplies the common session type REST-style providers share.
//!
//! - [`http`] - bearer-token HTTP session with throttle detection

pub mod http;

pub use http::HttpConnection;
