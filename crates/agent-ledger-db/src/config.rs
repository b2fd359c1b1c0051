//! Database configuration

use serde::{Deserialize, Serialize};

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub postgres_url: String,
    /// Maximum PostgreSQL connections
    pub pg_max_connections: u32,
    /// Minimum PostgreSQL connections
    pub pg_min_connections: u32,
    /// Connection acquire timeout in seconds
    pub pg_acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            postgres_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/agent_ledger".to_string()),
            pg_max_connections: 20,
            pg_min_connections: 2,
            pg_acquire_timeout_secs: 30,
        }
    }
}

impl DatabaseConfig {
    /// Mask the password in the PostgreSQL URL for logging
    pub fn postgres_url_masked(&self) -> String {
        mask_url(&self.postgres_url)
    }
}

fn mask_url(url: &str) -> String {
    let (Some(scheme_end), Some(at_pos)) = (url.find("://"), url.rfind('@')) else {
        return url.to_string();
    };
    if at_pos < scheme_end {
        return url.to_string();
    }

    let user_pass = &url[scheme_end + 3..at_pos];
    match user_pass.find(':') {
        Some(colon_pos) => format!(
            "{}{}:***{}",
            &url[..scheme_end + 3],
            &user_pass[..colon_pos],
            &url[at_pos..]
        ),
        None => url.to_string(),
    }
}
