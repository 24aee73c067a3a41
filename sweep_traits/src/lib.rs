pub mod context;

pub use context::TrackedContext;
