// Adapters layer: concrete implementations of the domain ports (backend HTTP client, local files).

pub mod http;
pub mod storage;

pub use http::HttpBackend;
pub use storage::LocalStorage;
