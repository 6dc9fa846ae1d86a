//! REST plumbing: auth endpoints, the bearer-authenticated client, wire types.

pub mod api;
pub mod client;
pub mod types;
