use tokio::sync::mpsc;
use wifi_provision::{Event, Orchestrator};

#[tokio::main]
async fn main() -> wifi_provision::Result<()> {
    env_logger::init();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let orchestrator = Orchestrator::detect().await.with_events(tx);

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                Event::BootstrapCompleted => println!("wifi connection confirmed"),
                Event::ProvisioningStarted { networks } => {
                    println!("no wifi; configuration AP is up. Nearby networks:");
                    for ssid in networks {
                        println!("  {ssid}");
                    }
                }
                other => println!("event: {other:?}"),
            }
        }
    });

    let mode = orchestrator.bootstrap().await?;
    println!("device is in {mode} mode");

    Ok(())
}
