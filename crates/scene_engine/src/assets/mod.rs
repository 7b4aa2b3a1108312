//! Asset loading and content management.

mod content;

pub use content::{AssetLoader, ContentError, ContentManager, LoadHandle};
