use clap::Parser;

/// EldaFriend backend CLI arguments. Flags override environment values.
#[derive(Debug, Default, Parser)]
#[command(
    name = "eldafriend",
    version,
    about = "Medicine scheduling and adherence tracking backend"
)]
pub struct Cli {
    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,

    /// SQLite connection URL, e.g. sqlite://eldafriend.db
    #[arg(long)]
    pub database_url: Option<String>,

    /// Email relay endpoint used to deliver signup OTPs
    #[arg(long)]
    pub notify_url: Option<String>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
