pub mod api;
pub mod client;
pub mod loader;
pub mod local;

pub use api::{DatasetError, DatasetSource};
pub use client::HttpSource;
pub use loader::{dataset_file, resolve_set, DatasetLoader, LoadedDataset, DEFAULT_SET};
pub use local::DirSource;
