//! Build script for usb-serial-bridge
//!
//! memory.x comes from embassy-stm32's `memory-x` feature; this only adds the
//! linker scripts.

fn main() {
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=build.rs");
}
