// Service layer for dependency injection and testability
//
// Traits in `traits.rs` are the ports to the outside world (filesystem,
// installed-app store, configuration). Adapters connect them to real
// infrastructure; tests swap in mockall mocks or the in-memory store.
//
// Usage Example:
//     // Production code
//     let fs = Arc::new(RealFileSystem);
//     let store = FileAppStore::new(fs, PathBuf::from("data"), "matcha-app-os", bus);
//     let snapshot = store.list("local").await?;
//
//     // Test code
//     let store = MemoryAppStore::new(bus);
//     store.install("local", "notepad", InstallMetadata::default()).await?;

pub mod config;
pub mod filesystem;
pub mod memory;
#[cfg(test)]
pub mod mocks;
pub mod storage;
pub mod subscription;
pub mod traits;

// Re-export commonly used types
pub use config::FileConfigService;
pub use filesystem::RealFileSystem;
pub use memory::MemoryAppStore;
pub use storage::FileAppStore;
pub use subscription::InstalledSubscription;
pub use traits::{
    AppStore, ConfigService, FileSystem, InstallMetadata, InstalledRecord, InstalledSnapshot,
};
