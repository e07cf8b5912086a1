//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `tiext_core` linkage without a running VM.
//! - Print the extension ids this build has typed handles for.

fn main() {
    println!("tiext_core version={}", tiext_core::core_version());
    for id in tiext_core::known_extension_ids() {
        println!("tiext_core extension={id}");
    }
}
