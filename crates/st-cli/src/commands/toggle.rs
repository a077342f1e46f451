//! Toggle command: the hot-key surface.
//!
//! A global hot-key binding (OS keybind, tiling WM binding, Stream Deck)
//! runs `st toggle`; this just invokes the daemon's toggle endpoint.

use std::io::Write;
use std::net::SocketAddr;

use anyhow::{Context, Result};

use super::serve::ToggleResponse;

pub async fn run<W: Write>(writer: &mut W, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{addr}/toggle");
    let response = reqwest::Client::new()
        .post(&url)
        .send()
        .await
        .with_context(|| format!("failed to reach the daemon at {url}; is `st serve` running?"))?;
    let toggled: ToggleResponse = response
        .error_for_status()
        .context("daemon rejected the toggle")?
        .json()
        .await
        .context("daemon returned an invalid toggle response")?;

    if toggled.running {
        writeln!(writer, "Timer started.")?;
    } else {
        writeln!(writer, "Timer stopped; session recorded.")?;
    }
    Ok(())
}
