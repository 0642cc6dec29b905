//! Embed renderers.

pub mod plain;

pub use plain::PlainEmbedRenderer;
