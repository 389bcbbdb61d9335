//! Command Line Interface (CLI) arguments.

use clap::Parser;

/// Crude assay server command line interface
#[derive(Clone, Debug, Parser)]
pub struct CommandLineArgs {
    /// The IP address on which the server should listen
    #[arg(long, default_value = "0.0.0.0", env = "CRUDE_ASSAY_HOST")]
    pub host: String,
    /// The port to which the server should bind
    #[arg(long, default_value_t = 8080, env = "CRUDE_ASSAY_PORT")]
    pub port: u16,
    /// Flag indicating whether HTTPS should be used
    #[arg(long, default_value_t = false, env = "CRUDE_ASSAY_HTTPS")]
    pub https: bool,
    /// Path to the certificate file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/crude-assay/certs/cert.pem",
        env = "CRUDE_ASSAY_CERT_FILE"
    )]
    pub cert_file: String,
    /// Path to the key file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/crude-assay/certs/key.pem",
        env = "CRUDE_ASSAY_KEY_FILE"
    )]
    pub key_file: String,
    /// Maximum time in seconds to wait for operations to complete upon receiving `ctrl+c` signal.
    #[arg(long, default_value_t = 60, env = "CRUDE_ASSAY_SHUTDOWN_TIMEOUT")]
    pub graceful_shutdown_timeout: u64,
    /// Whether to enable sending traces to Jaeger.
    #[arg(long, default_value_t = false, env = "CRUDE_ASSAY_ENABLE_JAEGER")]
    pub enable_jaeger: bool,
    /// PostgreSQL connection URL of the assay database
    #[arg(long, env = "CRUDE_ASSAY_DATABASE_URL", hide_env_values = true)]
    pub database_url: String,
    /// Maximum number of pooled database connections
    #[arg(long, default_value_t = 10, env = "CRUDE_ASSAY_DATABASE_MAX_CONNECTIONS")]
    pub database_max_connections: u32,
    /// Maximum time in seconds to wait for a pooled database connection
    #[arg(long, default_value_t = 5, env = "CRUDE_ASSAY_DATABASE_ACQUIRE_TIMEOUT")]
    pub database_acquire_timeout: u64,
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}
