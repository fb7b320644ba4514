// Storefront API client - library root
//
// Wraps every outbound call to the storefront API with session-expiry
// detection, single-flight credential refresh and a one-shot retry.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod redirect;
pub mod refresh;
