use std::env;

use anyhow::Result;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Database. `None` runs the API on in-memory stores.
    pub database_url: Option<String>,

    // Web server
    pub web_host: String,
    pub web_port: u16,

    // CORS
    pub allowed_origins: Vec<String>,

    // Notifications
    pub resend_api_key: Option<String>,
    pub notify_from: String,
    pub notify_recipients: Vec<String>,
}

impl Config {
    /// Load configuration from the process environment (and `.env` when present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            allowed_origins: split_list(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
            resend_api_key: env::var("RESEND_API_KEY").ok().filter(|s| !s.is_empty()),
            notify_from: env::var("NOTIFY_FROM")
                .unwrap_or_else(|_| "Tour Operations <noreply@tourops.local>".to_string()),
            notify_recipients: split_list(&env::var("NOTIFY_RECIPIENTS").unwrap_or_default()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.web_host, self.web_port)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_drops_blanks() {
        assert_eq!(
            split_list(" a@x.com, ,b@x.com,"),
            vec!["a@x.com".to_string(), "b@x.com".to_string()]
        );
        assert!(split_list("").is_empty());
    }
}
