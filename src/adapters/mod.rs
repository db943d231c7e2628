// Adapters layer: concrete backends behind the `BackendClient` port.

pub mod memory;
pub mod rest;

pub use memory::InMemoryBackend;
pub use rest::RestBackend;
