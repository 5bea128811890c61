pub mod item;

pub use item::{ContentItem, ImageMeta, SplitSegment};
