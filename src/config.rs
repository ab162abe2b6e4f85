use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, fmt};

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_EXPIRY_SECS: u64 = 3600;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173";
/// Upper bound accepted by SigV4 query-string signing (7 days).
const MAX_EXPIRY_SECS: u64 = 604_800;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub bucket: String,
    pub endpoint_url: Option<String>,
    pub url_expiry_secs: u64,
    pub cors_origins: Vec<String>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Presigned URL gateway for a single S3 bucket")]
pub struct Args {
    /// Host to bind to (overrides MEDIA_GATEWAY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides MEDIA_GATEWAY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Bucket to serve (overrides S3_BUCKET_NAME)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Bucket region (overrides AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,
}

impl AppConfig {
    /// Parse `.env`, environment variables and CLI args into an AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(err).context("loading .env file");
            }
        }

        let args = Args::parse();
        Self::resolve(&args, |name| env::var(name).ok())
    }

    /// Merge CLI args over values produced by `lookup`.
    ///
    /// Empty values are treated as unset. Missing credentials or bucket name
    /// are fatal.
    pub fn resolve<F>(args: &Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let access_key_id = var("AWS_ACCESS_KEY_ID");
        let secret_access_key = var("AWS_SECRET_ACCESS_KEY");
        let (Some(access_key_id), Some(secret_access_key)) = (access_key_id, secret_access_key)
        else {
            bail!(
                "AWS credentials not found. Please set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY"
            );
        };

        let Some(bucket) = args.bucket.clone().or_else(|| var("S3_BUCKET_NAME")) else {
            bail!("S3_BUCKET_NAME environment variable is required");
        };

        let port = match (args.port, var("MEDIA_GATEWAY_PORT")) {
            (Some(port), _) => port,
            (None, Some(value)) => value
                .parse::<u16>()
                .with_context(|| format!("parsing MEDIA_GATEWAY_PORT value `{}`", value))?,
            (None, None) => 8000,
        };

        let url_expiry_secs = match var("PRESIGNED_URL_EXPIRE") {
            Some(value) => value
                .parse::<u64>()
                .with_context(|| format!("parsing PRESIGNED_URL_EXPIRE value `{}`", value))?,
            None => DEFAULT_EXPIRY_SECS,
        };
        if url_expiry_secs == 0 || url_expiry_secs > MAX_EXPIRY_SECS {
            bail!(
                "PRESIGNED_URL_EXPIRE must be between 1 and {} seconds, got {}",
                MAX_EXPIRY_SECS,
                url_expiry_secs
            );
        }

        let cors_origins = parse_origins(
            &var("CORS_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.into()),
        );

        Ok(Self {
            host: args
                .host
                .clone()
                .or_else(|| var("MEDIA_GATEWAY_HOST"))
                .unwrap_or_else(|| "0.0.0.0".into()),
            port,
            access_key_id,
            secret_access_key,
            region: args
                .region
                .clone()
                .or_else(|| var("AWS_REGION"))
                .unwrap_or_else(|| DEFAULT_REGION.into()),
            bucket,
            endpoint_url: var("S3_ENDPOINT_URL"),
            url_expiry_secs,
            cors_origins,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Keeps both credentials out of startup logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("access_key_id", &"<redacted>")
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("endpoint_url", &self.endpoint_url)
            .field("url_expiry_secs", &self.url_expiry_secs)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| origin.trim_end_matches('/').to_string())
        .collect()
}
