//! Click counter emitters.
//!
//! - [`RedisClickPublisher`] - Publishes to a Redis channel for an external pipeline
//! - [`QueueClickEmitter`] - Feeds the in-process aggregation worker

mod queue;
mod redis_publisher;
mod service;

pub use queue::QueueClickEmitter;
pub use redis_publisher::RedisClickPublisher;
pub use service::ClickEmitter;

#[cfg(test)]
pub use service::MockClickEmitter;
