//! Minimal flipdown usage: a five second countdown printed to stdout.
//!
//! ```bash
//! cargo run --example basic
//! ```

use flipdown::{Clock, ClockOptions, MemorySurface, TimeSource as _, WallTime};
use tokio::sync::oneshot;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("flipdown=info").init();

    let surface = MemorySurface::new();
    let board = surface.clone();
    let options = ClockOptions::default().on_tick(move |remaining, _now| {
        println!("{} ({remaining:.1}s)", board.snapshot().render_line());
    });

    let clock = Clock::new(WallTime.now() + 5.0, surface, options)?;

    let (ended_tx, ended_rx) = oneshot::channel();
    clock
        .if_ended(move || {
            let _ = ended_tx.send(());
        })
        .await
        .start()
        .await;

    ended_rx.await?;
    println!("The countdown has ended!");
    clock.stop().await;
    Ok(())
}
