//! Tests for the consensus module.
//!
//! - `engine_tests`: `Dispatcher` fan-out, timing and fault handling
//! - Unit tests for resolvers, comparison and errors are in their respective modules
