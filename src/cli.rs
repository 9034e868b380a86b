//! Command Line Interface (CLI) arguments.

use clap::Parser;
use url::Url;

/// Common queries command line interface
#[derive(Clone, Debug, Parser)]
pub struct CommandLineArgs {
    /// The IP address on which the server should listen
    #[arg(long, default_value = "0.0.0.0", env = "COMMON_QUERIES_HOST")]
    pub host: String,
    /// The port to which the server should bind
    #[arg(long, default_value_t = 8080, env = "COMMON_QUERIES_PORT")]
    pub port: u16,
    /// Flag indicating whether HTTPS should be used
    #[arg(long, default_value_t = false, env = "COMMON_QUERIES_HTTPS")]
    pub https: bool,
    /// Path to the certificate file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/common-queries/certs/cert.pem",
        env = "COMMON_QUERIES_CERT_FILE"
    )]
    pub cert_file: String,
    /// Path to the key file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/common-queries/certs/key.pem",
        env = "COMMON_QUERIES_KEY_FILE"
    )]
    pub key_file: String,
    /// Maximum time in seconds to wait for operations to complete upon receiving `ctrl+c` signal.
    #[arg(long, default_value_t = 60, env = "COMMON_QUERIES_SHUTDOWN_TIMEOUT")]
    pub graceful_shutdown_timeout: u64,
    /// Whether to enable sending traces to Jaeger.
    #[arg(long, default_value_t = false, env = "COMMON_QUERIES_ENABLE_JAEGER")]
    pub enable_jaeger: bool,
    /// URL of the Elasticsearch cluster holding the archive indices
    #[arg(
        long,
        default_value = "https://jasmin-es1.ceda.ac.uk",
        env = "COMMON_QUERIES_ELASTICSEARCH_URL"
    )]
    pub elasticsearch_url: Url,
    /// Name of the index holding one document per archived file
    #[arg(long, default_value = "ceda-fbi", env = "COMMON_QUERIES_FILE_INDEX")]
    pub file_index: String,
    /// Name of the index holding one document per archive directory
    #[arg(long, default_value = "ceda-dirs", env = "COMMON_QUERIES_DIRECTORY_INDEX")]
    pub directory_index: String,
    /// Number of buckets requested per composite aggregation page
    #[arg(
        long,
        default_value_t = 100,
        value_parser = clap::value_parser!(u32).range(1..),
        env = "COMMON_QUERIES_PAGE_SIZE"
    )]
    pub page_size: u32,
    /// Optional timeout in seconds for each request to the search backend
    #[arg(long, env = "COMMON_QUERIES_BACKEND_TIMEOUT")]
    pub backend_timeout: Option<u64>,
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}
