//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `tempo_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    // Tiny probe to validate core crate wiring independently from the UI
    // shell runtime setup.
    println!("tempo_core ping={}", tempo_core::ping());
    println!("tempo_core version={}", tempo_core::core_version());
    println!(
        "tempo_core built_in_event_types={}",
        tempo_core::catalog::built_in_types().len()
    );
}
