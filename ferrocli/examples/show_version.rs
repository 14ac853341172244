//! Connect to a Cisco device over telnet and run `show version`.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example show_version -- --host 192.0.2.1 --id switch --password secret
//! ```
//!
//! Add `--enable-password` to enter privileged EXEC mode first.

use std::env;
use std::time::Duration;

use ferrocli::SessionBuilder;
use ferrocli::config::{DeriveOptions, DeviceConfig, DeviceProfile, default_hooks, derive};
use ferrocli::error::ChannelError;
use secrecy::SecretString;
use tokio::net::TcpStream;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = DeviceConfig {
        id: Some(args.id),
        address: Some(args.host),
        port: args.port,
        password: Some(SecretString::from(args.password)),
        enable_password: args.enable_password.map(SecretString::from),
        ..Default::default()
    }
    .with_defaults();
    let config = derive(config, &default_hooks(), DeriveOptions::default())?;
    let profile = DeviceProfile::try_from(config)?;

    let address = profile.address.clone().unwrap_or_default();
    let port = profile.port.unwrap_or(23);
    let connect_timeout = profile.connect_timeout.unwrap_or(Duration::from_secs(5));

    println!("Connecting to {}:{}...", address, port);
    let connect = TcpStream::connect((address.as_str(), port));
    let stream = tokio::time::timeout(connect_timeout, connect)
        .await?
        .map_err(ChannelError::Io)?;

    let privileged = profile.enable_password.is_some();
    let mut session = SessionBuilder::new(profile).build_stream(stream);

    session.login().await?;
    if privileged {
        session.enable().await?;
    }

    match session.run_command("show version").await {
        Ok(output) => println!("{output}"),
        Err(e) if e.is_command_error() => eprintln!("Device rejected the command: {e}"),
        Err(e) => return Err(e.into()),
    }

    session.exit().await?;
    Ok(())
}

struct Args {
    host: String,
    port: Option<u16>,
    id: String,
    password: String,
    enable_password: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut host = "localhost".to_string();
        let mut port = None;
        let mut id = "switch".to_string();
        let mut password = String::new();
        let mut enable_password = None;

        let mut i = 1;
        while i < args.len() {
            let value = args.get(i + 1).cloned();
            match args[i].as_str() {
                "--host" | "-h" => host = value.unwrap_or(host),
                "--port" | "-p" => port = value.and_then(|v| v.parse().ok()),
                "--id" => id = value.unwrap_or(id),
                "--password" | "-P" => password = value.unwrap_or_default(),
                "--enable-password" | "-E" => enable_password = value,
                other => {
                    eprintln!("Unknown argument: {}", other);
                    i += 1;
                    continue;
                }
            }
            i += 2;
        }

        Self {
            host,
            port,
            id,
            password,
            enable_password,
        }
    }
}
