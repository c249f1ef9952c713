use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use snapcode_core::prelude::*;
use snapcode_fs::FileSystemStore;
use snapcode_imaging::BrandingLayer;
use snapcode_notify::{ConfiguredNotifier, LogNotifier, SmtpConfig, SmtpNotifier};
use snapcode_server::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snapcode")]
#[command(about = "Event photo server: upload, brand and share by QR code")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    paths: PathArgs,

    /// Externally reachable base URL encoded into QR codes
    #[arg(long, env = "SNAPCODE_PUBLIC_URL", default_value = DEFAULT_PUBLIC_URL, global = true)]
    public_url: String,
}

#[derive(Args)]
struct PathArgs {
    /// Directory holding uploaded assets
    #[arg(long, env = "SNAPCODE_ASSETS_DIR", default_value = "uploads", global = true)]
    assets_dir: PathBuf,

    /// Directory holding generated QR codes
    #[arg(long, env = "SNAPCODE_CODES_DIR", default_value = "qrcodes", global = true)]
    codes_dir: PathBuf,

    /// Overlay composited onto every still image
    #[arg(
        long,
        env = "SNAPCODE_BRANDING",
        default_value = "templates/frame.png",
        global = true
    )]
    branding: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        #[arg(long, env = "SNAPCODE_BIND", default_value = "0.0.0.0")]
        bind: String,

        #[arg(short, long, env = "PORT", default_value_t = 5000)]
        port: u16,

        /// Largest accepted upload, in MiB
        #[arg(long, env = "SNAPCODE_BODY_LIMIT_MB", default_value_t = 100)]
        body_limit_mb: usize,

        #[command(flatten)]
        mail: MailArgs,
    },
    /// Run a local file through the pipeline and print the receipt
    Ingest {
        path: PathBuf,

        /// Email the finished asset to this address
        #[arg(long)]
        email: Option<String>,

        #[command(flatten)]
        mail: MailArgs,
    },
    /// List stored assets, newest first
    Gallery {
        /// Only names containing this text (case-insensitive)
        #[arg(short, long, default_value = "")]
        search: String,
    },
}

#[derive(Args)]
struct MailArgs {
    /// SMTP relay; without it emails are only logged
    #[arg(long, env = "SMTP_HOST")]
    smtp_host: Option<String>,

    #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
    smtp_port: u16,

    #[arg(long, env = "SMTP_USERNAME")]
    smtp_username: Option<String>,

    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    smtp_password: Option<String>,

    #[arg(long, env = "SMTP_FROM", default_value = "noreply@localhost")]
    smtp_from: String,

    /// Seconds before a delivery is abandoned
    #[arg(long, env = "SNAPCODE_NOTIFY_TIMEOUT", default_value_t = 30)]
    notify_timeout: u64,
}

impl MailArgs {
    fn timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout)
    }

    fn notifier(self) -> anyhow::Result<ConfiguredNotifier> {
        let timeout = self.timeout();
        let Some(host) = self.smtp_host else {
            info!("SMTP_HOST not set, emails will only be logged");
            return Ok(ConfiguredNotifier::Log(LogNotifier));
        };

        let notifier = SmtpNotifier::new(SmtpConfig {
            host,
            port: self.smtp_port,
            username: self.smtp_username,
            password: self.smtp_password,
            from: self.smtp_from,
            timeout,
        })?;
        Ok(ConfiguredNotifier::Smtp(notifier))
    }
}

impl PathArgs {
    /// Creates the store directories and the overlay's directory, then loads the overlay.
    async fn bootstrap(
        &self,
    ) -> anyhow::Result<(FileSystemStore, FileSystemStore, BrandingLayer)> {
        let assets = FileSystemStore::new(&self.assets_dir);
        let codes = FileSystemStore::new(&self.codes_dir);
        assets.ensure_dir().await?;
        codes.ensure_dir().await?;
        if let Some(parent) = self.branding.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let branding = BrandingLayer::load(&self.branding).with_context(|| {
            format!(
                "Place the branding overlay at {} or pass --branding",
                self.branding.display()
            )
        })?;

        Ok((assets, codes, branding))
    }
}

fn filename_of(path: &Path) -> anyhow::Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .with_context(|| format!("{} has no file name", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            port,
            body_limit_mb,
            mail,
        } => {
            let (assets, codes, branding) = cli.paths.bootstrap().await?;
            let config = SnapcodeConfig {
                public_url: cli.public_url,
                notify_timeout: mail.timeout(),
                body_limit: body_limit_mb * 1024 * 1024,
            };
            let app =
                SnapcodeServer::new(config).build(assets, codes, branding, mail.notifier()?);

            let addr = format!("{bind}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Cannot bind {addr}"))?;
            println!("📸 Server listening on http://{addr}");
            axum::serve(listener, app).await?;
        }
        Commands::Ingest { path, email, mail } => {
            let (assets, codes, branding) = cli.paths.bootstrap().await?;
            let config = SnapcodeConfig {
                public_url: cli.public_url,
                notify_timeout: mail.timeout(),
                ..Default::default()
            };
            let ingestor =
                SnapcodeServer::new(config).ingestor(assets, codes, branding, mail.notifier()?);

            let data = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Cannot read {}", path.display()))?;
            let receipt = ingestor
                .ingest(Upload {
                    filename: filename_of(&path)?,
                    data: data.into(),
                    email,
                })
                .await?;

            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
        Commands::Gallery { search } => {
            let assets = FileSystemStore::new(&cli.paths.assets_dir);
            for name in filter_listing(assets.list().await?, &search) {
                println!("{name}");
            }
        }
    }

    Ok(())
}
