//! Tracing setup.

mod tracing;

use anyhow::Context;

/// Installs the global subscriber.
pub(crate) fn init_tracing() -> anyhow::Result<()> {
    tracing::init_tracing().context("Failed to initialize tracing")
}
