use anyhow::Context;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "resultd=info";

/// Largest accepted cap for a single score component.
pub const MAX_COMPONENT_CAP: i64 = 1000;

/// Upper bounds for each component of a score triplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCaps {
    pub mid: i64,
    pub session: i64,
    #[serde(rename = "final")]
    pub final_exam: i64,
}

impl Default for ScoreCaps {
    fn default() -> Self {
        Self {
            mid: 18,
            session: 6,
            final_exam: 32,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub caps: ScoreCaps,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ScoreCaps::default();
        let caps = ScoreCaps {
            mid: read_cap(&lookup, "RESULTD_MID_MAX", defaults.mid)?,
            session: read_cap(&lookup, "RESULTD_SESSION_MAX", defaults.session)?,
            final_exam: read_cap(&lookup, "RESULTD_FINAL_MAX", defaults.final_exam)?,
        };
        let log_filter = lookup("RESULTD_LOG")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        let cfg = Self { caps, log_filter };
        cfg.env_filter()?;
        Ok(cfg)
    }

    pub fn env_filter(&self) -> anyhow::Result<EnvFilter> {
        EnvFilter::try_new(&self.log_filter)
            .with_context(|| format!("RESULTD_LOG is not a valid filter: {:?}", self.log_filter))
    }
}

fn read_cap<F>(lookup: &F, key: &str, default: i64) -> anyhow::Result<i64>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let v: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be an integer, got {raw:?}"))?;
    anyhow::ensure!(
        (0..=MAX_COMPONENT_CAP).contains(&v),
        "{key} must be between 0 and {MAX_COMPONENT_CAP}, got {v}"
    );
    Ok(v)
}
