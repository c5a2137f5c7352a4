//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `stockpad_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    // Tiny probe to validate core crate wiring independently from the
    // Flutter/FFI runtime setup.
    println!("stockpad_core ping={}", stockpad_core::ping());
    println!("stockpad_core version={}", stockpad_core::core_version());
}
