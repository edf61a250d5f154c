use std::error::Error;

use pressure_monitor::memory::{MonitorEvent, PressureMonitor};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    pressure_monitor::init_logging();

    println!("Memory Pressure Monitor (Ctrl-C to stop)");
    println!("========================================");

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let handle = PressureMonitor::with_system_sampler(tx).spawn();
    let mut refreshed = false;

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                println!("{}", serde_json::to_string(&event)?);

                // Simulate a menu opening right after the first swap figure arrives
                if !refreshed && matches!(event, MonitorEvent::SwapUpdated(_)) {
                    refreshed = handle.request_swap_refresh();
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nStopping monitor");
                break;
            }
        }
    }

    handle.shutdown().await?;
    Ok(())
}
