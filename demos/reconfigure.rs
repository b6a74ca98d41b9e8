use std::env;
use wifi_provision::{Credentials, Orchestrator};

#[tokio::main]
async fn main() -> wifi_provision::Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let ssid = args.next().unwrap_or_else(|| {
        eprintln!("usage: reconfigure <ssid> [passphrase]");
        std::process::exit(2);
    });
    let passphrase = args.next();

    let creds = Credentials::new(&ssid, passphrase.as_deref())?;
    let orchestrator = Orchestrator::detect().await;

    println!("switching to '{}'...", creds.ssid());
    orchestrator.reconfigure(creds).await?;
    println!(
        "connected to '{}'",
        orchestrator.connected_network().await?
    );

    Ok(())
}
