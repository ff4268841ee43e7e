pub mod companies;
pub mod details;
pub mod search;
pub mod trends;

use std::path::Path;

use anyhow::{Context, Result};
use pubtrend::service::{Notice, NoticeLevel};
use pubtrend::{ClientConfig, CompanyRegistry, PubMedClient};

pub fn create_pubtrend_client(api_key: Option<&str>, email: Option<&str>, tool: &str) -> PubMedClient {
    let mut config = ClientConfig::new().with_tool(tool);

    if let Some(key) = api_key {
        config = config.with_api_key(key);
    }

    if let Some(email) = email {
        config = config.with_email(email);
    }

    PubMedClient::with_config(config)
}

pub fn load_registry(path: &Path) -> Result<CompanyRegistry> {
    CompanyRegistry::load(path)
        .with_context(|| format!("Failed to load company configuration from {}", path.display()))
}

/// Route service notices to the log
pub fn log_notices(notices: &[Notice]) {
    for notice in notices {
        match notice.level {
            NoticeLevel::Info => tracing::info!("{}", notice.message),
            NoticeLevel::Warning => tracing::warn!("{}", notice.message),
            NoticeLevel::Error => tracing::error!("{}", notice.message),
        }
    }
}

/// Render a frequency table as aligned `label  count` lines
pub fn format_frequency_table(title: &str, entries: &[(String, usize)]) -> String {
    let mut out = format!("{title}\n");
    if entries.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }

    let width = entries
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    for (label, count) in entries {
        out.push_str(&format!("  {label:<width$}  {count:>6}\n"));
    }
    out
}
