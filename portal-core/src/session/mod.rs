pub mod storage;
pub mod store;
pub mod types;

pub use storage::{MemoryStorage, SessionStorage};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::JsonFileStorage;
pub use store::SessionStore;
pub use types::{Session, UserProfile, UserRole};
