//! Build script for RF433 firmware
//!
//! Handles:
//! - Memory layout search path (embassy-stm32 generates `memory.x`)
//! - Linker scripts for the firmware binary (`link.x`, `defmt.x`)

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Host builds need nothing from the linker side
    if std::env::var_os("CARGO_FEATURE_EMBEDDED").is_none() {
        return;
    }

    if let Ok(dir) = std::env::var("CARGO_MANIFEST_DIR") {
        println!("cargo:rustc-link-search={dir}");
    }

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
