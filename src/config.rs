use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, TrackerError};

const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_CHECK_INTERVAL_HOURS: f64 = 4.0;
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_PRICE_FILE: &str = "price_history.json";

/// SMTP settings for outgoing alerts
#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub email_from: String,
    pub email_password: String,
}

/// Settings shared by the tracker and the dashboard-only binary
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub port: u16,
    pub price_file: PathBuf,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            price_file: lookup("PRICE_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PRICE_FILE)),
        })
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub event_url: String,
    pub my_email: String,
    pub smtp: SmtpConfig,
    pub check_interval_hours: f64,
    pub check_interval: Duration,
    pub enable_dashboard: bool,
    pub dashboard: DashboardConfig,
}

impl Config {
    /// Load from the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup and validate the result
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).unwrap_or_default();

        let smtp_port = parse_or(&lookup, "SMTP_PORT", DEFAULT_SMTP_PORT)?;
        let dashboard = DashboardConfig::from_vars(&lookup)?;
        let check_interval_hours =
            parse_or(&lookup, "CHECK_INTERVAL_HOURS", DEFAULT_CHECK_INTERVAL_HOURS)?;

        // Rejects zero, negatives, NaN and anything too large for a Duration
        let check_interval = Duration::try_from_secs_f64(check_interval_hours * 3600.0)
            .ok()
            .filter(|interval| !interval.is_zero())
            .ok_or_else(|| TrackerError::InvalidConfig {
                name: "CHECK_INTERVAL_HOURS",
                value: check_interval_hours.to_string(),
            })?;

        let config = Self {
            event_url: var("EVENT_URL"),
            my_email: var("MY_EMAIL"),
            smtp: SmtpConfig {
                server: lookup("SMTP_SERVER").unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string()),
                port: smtp_port,
                email_from: var("EMAIL_FROM"),
                email_password: var("EMAIL_PASSWORD"),
            },
            check_interval_hours,
            check_interval,
            enable_dashboard: lookup("ENABLE_DASHBOARD")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(true),
            dashboard,
        };

        config.validate()?;
        Ok(config)
    }

    /// Every required value must be non-empty; all missing names are reported together
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("EVENT_URL", &self.event_url),
            ("MY_EMAIL", &self.my_email),
            ("EMAIL_FROM", &self.smtp.email_from),
            ("EMAIL_PASSWORD", &self.smtp.email_password),
        ];

        let missing: Vec<String> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(TrackerError::MissingConfig(missing))
        }
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| TrackerError::InvalidConfig { name, value: raw }),
        _ => Ok(default),
    }
}
