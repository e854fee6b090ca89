pub mod data_dir;
pub mod mapping;
pub mod sessions;

pub use data_dir::DataDir;
pub use sessions::Frame;
