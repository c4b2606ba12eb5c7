use tracing::Level;

// Installs the json subscriber used by binaries embedding the catalog. A second call keeps
// the subscriber already installed.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        // module names are noise in every line
        .with_target(false)
        // plain output for log collectors
        .with_ansi(false)
        .without_time()
        .json()
        .try_init();
}
