//! Shared helpers for request parameter handling.

pub mod block_param;

pub use block_param::{BlockParameter, BlockTag};
