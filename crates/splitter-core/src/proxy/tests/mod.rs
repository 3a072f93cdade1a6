//! Tests for the proxy module.
//!
//! - `engine_tests`: request routing, parameter decoding and tag normalization through
//!   `ProxyEngine` against scripted endpoints
//! - Unit tests for params and errors are in their respective modules
