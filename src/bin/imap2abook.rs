use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{debug, info, warn};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use imap2abook::auth::password;
use imap2abook::config::{Config, Settings, load_config};
use imap2abook::harvest;
use imap2abook::mail::imap_client::ImapClient;
use imap2abook::render::render;

/// Harvest destination addresses from an IMAP mailbox to create an address book
#[derive(Parser, Debug)]
#[command(name = "imap2abook")]
#[command(version, long_about = None)]
struct Args {
    /// Address of the IMAPS server
    #[arg(short, long)]
    server: Option<String>,

    /// Port of the IMAPS server [default: 993]
    #[arg(short, long)]
    port: Option<u16>,

    /// User name
    #[arg(short, long)]
    user: Option<String>,

    /// Password; taken from the keyring or prompted for when omitted
    #[arg(short = 'w', long)]
    password: Option<String>,

    /// IMAP folder
    #[arg(short, long)]
    folder: Option<String>,

    /// Maximum age (in days) of messages to harvest; 0 = unlimited
    #[arg(short = 'a', long)]
    max_age: Option<u32>,

    /// Output in vCard format
    #[arg(short, long)]
    vcard: bool,

    /// For addresses with no name, use the address as name; otherwise omitted
    #[arg(short, long = "email")]
    email_as_name: bool,

    /// Only consider messages sent From: this address (typically your own)
    #[arg(short = 'F', long)]
    from: Option<String>,

    /// Write the address book here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file [default: <config dir>/imap2abook/config.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Store the password in the OS keyring after a successful run
    #[arg(long)]
    save_password: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn overrides(&self) -> Config {
        Config {
            server: self.server.clone(),
            port: self.port,
            user: self.user.clone(),
            folder: self.folder.clone(),
            max_age: self.max_age,
            vcard: self.vcard.then_some(true),
            email_as_name: self.email_as_name.then_some(true),
            from: self.from.clone(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let file_cfg = load_config(args.config.as_deref()).context("Configuration error")?;
    let settings =
        Settings::try_from(file_cfg.merged_with(args.overrides())).context("Configuration error")?;
    debug!("{settings:?}");

    let account = password::account(&settings.user, &settings.server);
    let pw = password::resolve_password(args.password.clone(), &account)?;

    let filter = settings.date_filter(chrono::Utc::now());
    let client = ImapClient::new(
        &settings.server,
        settings.port,
        &settings.user,
        &pw,
        &settings.folder,
    );

    let result = harvest(client, &filter)
        .with_context(|| format!("harvest from {}:{} failed", settings.server, settings.port))?;

    if args.save_password {
        if let Err(e) = password::save_password(&account, &pw) {
            warn!("couldn't save password to keyring: {e}");
        } else {
            info!("Saved password into keyring for {account}");
        }
    }

    let written = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            render(
                &result.book,
                settings.format,
                settings.email_as_name,
                BufWriter::new(file),
            )?
        }
        None => render(
            &result.book,
            settings.format,
            settings.email_as_name,
            std::io::stdout().lock(),
        )?,
    };
    info!("{written} of {} entries written", result.book.len());

    Ok(())
}
