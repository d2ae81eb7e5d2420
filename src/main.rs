use anyhow::{anyhow, Result};
use dynup::{Config, UpdateClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "/path/to/config.json add|del <domain> <record-name> <value>";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let mut args = std::env::args();
    let program_name = args.next().unwrap_or("dynup".to_string());
    let (config_file, command, domain, record_name, value) =
        match (args.next(), args.next(), args.next(), args.next(), args.next()) {
            (Some(config), Some(command), Some(domain), Some(record), Some(value)) => {
                (config, command, domain, record, value)
            }
            _ => return Err(anyhow!("usage: {program_name} {USAGE}")),
        };

    let config = Config::try_from_file(&config_file)?;
    tracing::debug!("loaded config from {config_file}");

    let client = UpdateClient::new(config.server_addr(), config.tsig_key()?);
    match command.as_str() {
        "add" => {
            client
                .add_txt_record(&domain, &record_name, &value, config.ttl)
                .await?;
            tracing::info!("added TXT record at {record_name}");
        }
        "del" => {
            client.del_txt_record(&domain, &record_name, &value).await?;
            tracing::info!("deleted TXT record at {record_name}");
        }
        _ => return Err(anyhow!("unknown command \"{command}\"; usage: {program_name} {USAGE}")),
    }
    Ok(())
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dynup=info".into()),
        )
        .init();
}
