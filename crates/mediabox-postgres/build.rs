#![forbid(unsafe_code)]

/// `embed_migrations!` is not rerun when only SQL files change, so the crate
/// is rebuilt whenever anything below the migrations directory does.
fn main() {
    println!("cargo:rerun-if-changed=./src/migrations");
}
