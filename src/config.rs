use anyhow::{Context, Result};
use clap::Parser;
use std::env;

const MIB: f64 = 1024.0 * 1024.0;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments. Built once at startup
/// and shared read-only with every handler.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub region: String,
    /// Target bucket; `None` when `S3_BUCKET` is unset or empty.
    pub bucket: Option<String>,
    /// Key prefix without trailing slashes; may be empty.
    pub prefix: String,
    pub max_upload_bytes: usize,
    /// Custom endpoint for S3-compatible providers (MinIO, Spaces, ...).
    pub endpoint_url: Option<String>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "HTTP gateway for listing, uploading and downloading bucket objects")]
pub struct Args {
    /// Host to bind to (overrides HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Storage region (overrides AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Bucket name (overrides S3_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Key prefix for generated keys and listings (overrides S3_PREFIX)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Maximum upload size in MiB (overrides FILE_MAX_MB)
    #[arg(long)]
    pub max_upload_mb: Option<f64>,

    /// Custom S3 endpoint URL (overrides S3_ENDPOINT_URL)
    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// Serve from an in-memory store instead of S3
    #[arg(long)]
    pub in_memory: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and the in-memory flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let in_memory = args.in_memory;
        let cfg = Self::resolve(args, |name| env::var(name).ok())?;
        Ok((cfg, in_memory))
    }

    /// Merge CLI args over values looked up by `env`, then over defaults.
    pub fn resolve(args: Args, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env_host = env("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let env_port = match env("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .with_context(|| format!("parsing PORT value `{}`", value))?,
            None => 5004,
        };
        let env_region = env("AWS_REGION").unwrap_or_else(|| "us-west-1".into());
        let env_max_mb = match env("FILE_MAX_MB") {
            Some(value) => value
                .trim()
                .parse::<f64>()
                .with_context(|| format!("parsing FILE_MAX_MB value `{}`", value))?,
            None => 10.0,
        };

        let max_mb = args.max_upload_mb.unwrap_or(env_max_mb);
        if !max_mb.is_finite() {
            anyhow::bail!("maximum upload size must be a finite number of MiB, got {}", max_mb);
        }

        let bucket = args
            .bucket
            .or_else(|| env("S3_BUCKET"))
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());
        let prefix = args
            .prefix
            .or_else(|| env("S3_PREFIX"))
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string();
        let endpoint_url = args
            .endpoint_url
            .or_else(|| env("S3_ENDPOINT_URL"))
            .filter(|e| !e.trim().is_empty());

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            region: args.region.unwrap_or(env_region),
            bucket,
            prefix,
            max_upload_bytes: (max_mb.max(1.0) * MIB) as usize,
            endpoint_url,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve_with(args: Args, vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::resolve(args, |name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_without_env() {
        let cfg = resolve_with(Args::default(), &[]).unwrap();
        assert_eq!(cfg.port, 5004);
        assert_eq!(cfg.region, "us-west-1");
        assert_eq!(cfg.bucket, None);
        assert_eq!(cfg.prefix, "");
        assert_eq!(cfg.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.addr(), "0.0.0.0:5004");
    }

    #[test]
    fn env_values_are_read() {
        let cfg = resolve_with(
            Args::default(),
            &[
                ("PORT", "8080"),
                ("AWS_REGION", "eu-west-1"),
                ("S3_BUCKET", "team-files"),
                ("S3_PREFIX", "uploads///"),
                ("FILE_MAX_MB", "25"),
            ],
        )
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.region, "eu-west-1");
        assert_eq!(cfg.bucket.as_deref(), Some("team-files"));
        assert_eq!(cfg.prefix, "uploads");
        assert_eq!(cfg.max_upload_bytes, 25 * 1024 * 1024);
    }

    #[test]
    fn args_override_env() {
        let args = Args {
            port: Some(9000),
            bucket: Some("from-cli".into()),
            ..Args::default()
        };
        let cfg = resolve_with(args, &[("PORT", "8080"), ("S3_BUCKET", "from-env")]).unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.bucket.as_deref(), Some("from-cli"));
    }

    #[test]
    fn empty_bucket_is_unset() {
        let cfg = resolve_with(Args::default(), &[("S3_BUCKET", "")]).unwrap();
        assert_eq!(cfg.bucket, None);
    }

    #[test]
    fn upload_cap_has_one_mib_floor() {
        let cfg = resolve_with(Args::default(), &[("FILE_MAX_MB", "0")]).unwrap();
        assert_eq!(cfg.max_upload_bytes, 1024 * 1024);

        let cfg = resolve_with(Args::default(), &[("FILE_MAX_MB", "1.5")]).unwrap();
        assert_eq!(cfg.max_upload_bytes, 1024 * 1024 * 3 / 2);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        assert!(resolve_with(Args::default(), &[("PORT", "http")]).is_err());
        assert!(resolve_with(Args::default(), &[("FILE_MAX_MB", "ten")]).is_err());
    }
}
