pub mod alias;
pub mod cursor;
pub mod pipeline;

pub use alias::DiskAliasResolver;
pub use cursor::LogCursor;
pub use pipeline::CapturePipeline;
