//! VK API client and models for the social graph

pub mod client;
pub mod error;
pub mod models;
pub mod snapshot;
pub mod traits;

pub use client::VkClient;
pub use error::VkError;
pub use models::*;
pub use traits::SocialGraphClient;

#[cfg(test)]
pub(crate) mod mock;
