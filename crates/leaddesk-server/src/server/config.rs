use anyhow::{Context, bail};
use axum::http::HeaderValue;
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf};

/// Runtime configuration for the `leaddesk-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file in the working directory is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "leaddesk-server",
    version,
    about = "An HTTP JSON service for sales leads with derived commissions"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:3000"))]
    pub server_addr: String,

    /// Path every lead route is mounted under.
    ///
    /// Environment variable: `ROUTE_PREFIX`
    #[arg(long, env = "ROUTE_PREFIX", default_value_t = String::from("/dashboard/v1"))]
    pub route_prefix: String,

    /// Origin allowed to make credentialed cross-origin requests. When unset,
    /// any origin is allowed without credentials.
    ///
    /// Environment variable: `CORS_URL`
    #[arg(long, env = "CORS_URL")]
    pub cors_url: Option<String>,

    /// JSON snapshot file backing the store. When unset, data lives only in
    /// memory and is lost on exit.
    ///
    /// Environment variable: `DATA_FILE`
    #[arg(long, env = "DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Largest request body accepted, in bytes.
    ///
    /// Environment variable: `BODY_LIMIT_BYTES`
    #[arg(long, env = "BODY_LIMIT_BYTES", default_value_t = 16 * 1024 * 1024)]
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: SocketAddr,
    pub route_prefix: String,
    pub cors_origin: Option<HeaderValue>,
    pub data_file: Option<PathBuf>,
    pub body_limit_bytes: usize,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let server_addr = args
            .server_addr
            .parse()
            .with_context(|| format!("SERVER_ADDR ({}) is not a socket address", args.server_addr))?;

        if !args.route_prefix.starts_with('/') {
            bail!("ROUTE_PREFIX ({}) must start with '/'", args.route_prefix);
        }
        let route_prefix = args.route_prefix.trim_end_matches('/').to_owned();

        if args.body_limit_bytes == 0 {
            bail!("BODY_LIMIT_BYTES must be greater than 0");
        }

        let cors_origin = args
            .cors_url
            .filter(|url| !url.trim().is_empty())
            .map(|url| {
                HeaderValue::from_str(url.trim())
                    .with_context(|| format!("CORS_URL ({url}) is not a valid origin"))
            })
            .transpose()?;

        Ok(Self {
            server_addr,
            route_prefix,
            cors_origin,
            data_file: args.data_file,
            body_limit_bytes: args.body_limit_bytes,
        })
    }
}
