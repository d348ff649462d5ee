//! Blocking entry points.
//!
//! Sessions are async. Tests that are not running inside a tokio runtime can
//! use [`block_on`] or [`Session::run_blocking`](crate::Session::run_blocking),
//! which create a current-thread runtime for the duration of the call.

use tokio::runtime::Builder;

use crate::error::{ResponderError, Result};

/// Run a future to completion on a new current-thread runtime.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
///
/// # Panics
///
/// Panics if called from within an async runtime.
pub fn block_on<F, T>(future: F) -> Result<T>
where
    F: std::future::Future<Output = T>,
{
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ResponderError::io_context("creating tokio runtime for block_on", e))?;

    Ok(runtime.block_on(future))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn block_on_drives_timers() {
        let value = block_on(async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            42
        })
        .unwrap();
        assert_eq!(value, 42);
    }
}
