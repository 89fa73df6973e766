use anyhow::{Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_MEDIA_TYPES: &str = "application/pdf,text/plain";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub identity_url: String,
    pub identity_service_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Upload size ceiling enforced before anything is stored.
    pub max_upload_bytes: usize,
    /// Media types accepted by the ingestion allow-list.
    pub allowed_media_types: Vec<String>,
    pub inference_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            identity_url: require_env("IDENTITY_URL")?,
            identity_service_key: require_env("IDENTITY_SERVICE_ROLE_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            allowed_media_types: parse_media_types(
                &std::env::var("ALLOWED_MEDIA_TYPES")
                    .unwrap_or_else(|_| DEFAULT_MEDIA_TYPES.to_string()),
            ),
            inference_timeout_secs: std::env::var("INFERENCE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse::<u64>()
                .context("INFERENCE_TIMEOUT_SECS must be a number of seconds")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_media_types(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_media_types_defaults() {
        let types = parse_media_types(DEFAULT_MEDIA_TYPES);
        assert_eq!(types, vec!["application/pdf", "text/plain"]);
    }

    #[test]
    fn test_parse_media_types_trims_and_lowercases() {
        let types = parse_media_types(" Application/PDF , text/plain ,");
        assert_eq!(types, vec!["application/pdf", "text/plain"]);
    }
}
