// Layout composition core: text splitting, page packing, image/text placement geometry.
// All operations are pure and synchronous; handlers run them inside spawn_blocking.

pub mod adapter;
pub mod composer;
pub mod geometry;
pub mod handlers;
pub mod packer;
pub mod splitter;

// Re-export the public API consumed by other modules (state, handlers).
pub use composer::CompositionConfig;
