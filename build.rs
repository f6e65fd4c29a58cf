//! Build script that ensures Cargo rebuilds when migrations change.
//!
//! `embed_migrations!` reads the manifest migrations at compile time, but
//! Cargo cannot see those files as inputs on its own.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
