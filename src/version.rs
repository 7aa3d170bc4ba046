// Version and build tracking for Matcha
// This file should be updated with each build

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const BUILD: &str = "0003";

pub fn version_string() -> String {
    format!("v{}-{}", VERSION, BUILD)
}

pub fn full_version_info() -> String {
    format!("Matcha {} (Build {})", VERSION, BUILD)
}
