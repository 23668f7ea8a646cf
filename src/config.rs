use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::{env, str::FromStr, time::Duration};

const DEFAULT_FOLDER: &str = "steam4all";
const DEFAULT_API_BASE_URL: &str = "https://api.cloudinary.com";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub provider: ProviderConfig,
}

/// Credentials and scoping for the media-hosting provider.
#[derive(Clone)]
pub struct ProviderConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    pub api_base_url: String,
    pub signature_algorithm: SignatureAlgorithm,
    pub timeout: Duration,
}

// Keeps the secret out of the startup log line.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("folder", &self.folder)
            .field("api_base_url", &self.api_base_url)
            .field("signature_algorithm", &self.signature_algorithm)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Digest used to sign upload requests. Must match the provider account setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl FromStr for SignatureAlgorithm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            other => Err(anyhow!("unsupported signature algorithm `{}`", other)),
        }
    }
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Student project showcase API")]
pub struct Args {
    /// Host to bind to (overrides SHOWCASE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides SHOWCASE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Largest accepted upload body in bytes (overrides SHOWCASE_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// Provider folder for uploads and listings (overrides CLOUDINARY_FOLDER)
    #[arg(long)]
    pub folder: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::from_sources(Args::parse(), |key| env::var(key).ok())
    }

    /// Build the config from parsed args and an environment lookup.
    pub fn from_sources<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_host = lookup("SHOWCASE_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let env_port = parse_or("SHOWCASE_PORT", &lookup, 3000u16)?;
        let env_max_upload = parse_or(
            "SHOWCASE_MAX_UPLOAD_BYTES",
            &lookup,
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;

        let env_folder = lookup("CLOUDINARY_FOLDER")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_FOLDER.into());

        let provider = ProviderConfig {
            cloud_name: required("CLOUDINARY_CLOUD_NAME", &lookup)?,
            api_key: required("CLOUDINARY_API_KEY", &lookup)?,
            api_secret: required("CLOUDINARY_API_SECRET", &lookup)?,
            folder: args.folder.unwrap_or(env_folder),
            api_base_url: lookup("CLOUDINARY_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.into())
                .trim_end_matches('/')
                .to_string(),
            signature_algorithm: parse_or(
                "CLOUDINARY_SIGNATURE_ALGORITHM",
                &lookup,
                SignatureAlgorithm::default(),
            )?,
            timeout: Duration::from_secs(parse_or("CLOUDINARY_TIMEOUT_SECS", &lookup, 60u64)?),
        };

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            max_upload_bytes: args.max_upload_bytes.unwrap_or(env_max_upload),
            provider,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required<F>(key: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("missing required environment variable {}", key))
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .parse::<T>()
            .map_err(|err| anyhow!("parsing {} value `{}`: {}", key, value, err)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const CREDENTIALS: [(&str, &str); 3] = [
        ("CLOUDINARY_CLOUD_NAME", "demo"),
        ("CLOUDINARY_API_KEY", "key"),
        ("CLOUDINARY_API_SECRET", "secret"),
    ];

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let cfg = AppConfig::from_sources(Args::default(), env_of(&CREDENTIALS)).unwrap();
        assert_eq!(cfg.addr(), "0.0.0.0:3000");
        assert_eq!(cfg.provider.folder, "steam4all");
        assert_eq!(cfg.provider.api_base_url, "https://api.cloudinary.com");
        assert_eq!(cfg.provider.signature_algorithm, SignatureAlgorithm::Sha1);
        assert_eq!(cfg.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn missing_secret_is_reported_by_name() {
        let err = AppConfig::from_sources(
            Args::default(),
            env_of(&[("CLOUDINARY_CLOUD_NAME", "demo"), ("CLOUDINARY_API_KEY", "key")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("CLOUDINARY_API_SECRET"));
    }

    #[test]
    fn args_override_environment() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.push(("SHOWCASE_PORT", "8080"));
        pairs.push(("CLOUDINARY_FOLDER", "from-env"));
        let args = Args {
            port: Some(9000),
            folder: Some("from-args".into()),
            ..Args::default()
        };
        let cfg = AppConfig::from_sources(args, env_of(&pairs)).unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.provider.folder, "from-args");
    }

    #[test]
    fn malformed_port_is_an_error() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.push(("SHOWCASE_PORT", "eighty"));
        let err = AppConfig::from_sources(Args::default(), env_of(&pairs)).unwrap_err();
        assert!(err.to_string().contains("SHOWCASE_PORT"));
    }

    #[test]
    fn signature_algorithm_parses_case_insensitively() {
        assert_eq!(
            "SHA256".parse::<SignatureAlgorithm>().unwrap(),
            SignatureAlgorithm::Sha256
        );
        assert!("md5".parse::<SignatureAlgorithm>().is_err());
    }

    #[test]
    fn debug_output_redacts_secret() {
        let cfg = AppConfig::from_sources(Args::default(), env_of(&CREDENTIALS)).unwrap();
        let rendered = format!("{:?}", cfg);
        assert!(!rendered.contains("\"secret\""));
        assert!(rendered.contains("<redacted>"));
    }
}
