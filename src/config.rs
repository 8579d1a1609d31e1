use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_DNB_DPL_BASE_URL: &str = "https://plus.dnb.com";
const DEFAULT_GLEIF_BASE_URL: &str = "https://api.gleif.org";
const DEFAULT_BLOCK_IDS: &str =
    "companyinfo_L2_v1,principalscontacts_L2_v2,hierarchyconnections_L1_v1";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bearer token for D&B Direct+; only the fetch commands need it.
    pub dnb_dpl_token: Option<String>,
    pub dnb_dpl_base_url: String,
    pub gleif_base_url: String,
    pub database_url: Option<String>,
    /// Requests per second shared by all outgoing API calls.
    pub rate_limit: u32,
    pub block_ids: Vec<String>,
    pub trade_up: Option<String>,
    pub in_dir: PathBuf,
    pub out_dir: PathBuf,
}

fn base_url(var: &str, default: &str) -> anyhow::Result<String> {
    let url = std::env::var(var)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string());

    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", var);
    }

    Ok(url.trim_end_matches('/').to_string())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            dnb_dpl_token: std::env::var("DNB_DPL_TOKEN")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            dnb_dpl_base_url: base_url("DNB_DPL_BASE_URL", DEFAULT_DNB_DPL_BASE_URL)?,
            gleif_base_url: base_url("GLEIF_BASE_URL", DEFAULT_GLEIF_BASE_URL)?,
            database_url: match std::env::var("DB_URL").or_else(|_| std::env::var("DATABASE_URL"))
            {
                Ok(url) if url.trim().is_empty() => None,
                Ok(url) => {
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                    }
                    Some(url)
                }
                Err(_) => None,
            },
            rate_limit: std::env::var("DNB_DPL_RATE_LIMIT")
                .unwrap_or_else(|_| "5".to_string())
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    anyhow::anyhow!("DNB_DPL_RATE_LIMIT must be a positive number of requests per second")
                })?,
            block_ids: std::env::var("DNB_DPL_BLOCK_IDS")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BLOCK_IDS.to_string())
                .split(',')
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect(),
            trade_up: match std::env::var("DNB_DPL_TRADE_UP") {
                Ok(t) if t.trim().is_empty() => None,
                Ok(t) => {
                    if t != "hq" && t != "domhq" {
                        anyhow::bail!("DNB_DPL_TRADE_UP must be either hq or domhq");
                    }
                    Some(t)
                }
                Err(_) => None,
            },
            in_dir: std::env::var("DNB_DPL_IN_DIR")
                .unwrap_or_else(|_| "in".to_string())
                .into(),
            out_dir: std::env::var("DNB_DPL_OUT_DIR")
                .unwrap_or_else(|_| "out".to_string())
                .into(),
        };

        // Never log the token itself
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("D&B Direct+ base URL: {}", config.dnb_dpl_base_url);
        tracing::debug!("Gleif base URL: {}", config.gleif_base_url);
        tracing::debug!("Data blocks: {}", config.block_ids.join(","));
        if let Some(ref url) = config.database_url {
            tracing::debug!("Database URL: {}...", &url[..20.min(url.len())]);
        }
        if config.dnb_dpl_token.is_none() {
            tracing::debug!("DNB_DPL_TOKEN not set, API requests are unavailable");
        }

        Ok(config)
    }

    /// The D&B Direct+ token, required by every request to plus.dnb.com.
    pub fn require_token(&self) -> anyhow::Result<&str> {
        self.dnb_dpl_token.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "Please set the D&B Direct+ token as environment variable DNB_DPL_TOKEN"
            )
        })
    }

    /// The Postgres connection string, required by the store commands.
    pub fn require_database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DB_URL or DATABASE_URL environment variable required"))
    }
}
