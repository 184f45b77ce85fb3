//! # arena_app: action service
//!
//! Hosts one [`MatchEngine`] behind the NATS action service.
//!
//! ## Startup Sequence
//!
//! 1. Parse arguments (NATS URL, subject prefix, optional rules file).
//! 2. Load the rules, or fall back to the built-in defaults.
//! 3. Serve actions until the NATS subscriptions close.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use arena_engine::{MatchEngine, RulesConfig};
use arena_system::{ActionService, ServiceConfig, SessionDirectory, SystemDispatcher};

/// Turn-based card battle service.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// NATS server URL.
    #[arg(long, env = "NATS_URL", default_value = "nats://localhost:4222")]
    nats_url: String,

    /// Prefix for every subject the service uses.
    #[arg(long, default_value = "arena")]
    prefix: String,

    /// JSON rules file; missing fields keep their defaults.
    #[arg(long)]
    rules: Option<PathBuf>,
}

fn load_rules(path: Option<&Path>) -> Result<RulesConfig> {
    let Some(path) = path else {
        return Ok(RulesConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading rules from {}", path.display()))?;
    let rules = RulesConfig::from_json(&text)
        .with_context(|| format!("loading rules from {}", path.display()))?;
    info!(path = %path.display(), units = rules.units.len(), "rules loaded");
    Ok(rules)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("arena_app=info".parse()?))
        .init();

    let args = Args::parse();
    info!(prefix = args.prefix, "arena service starting");

    let rules = load_rules(args.rules.as_deref())?;
    let dispatcher = SystemDispatcher::new(MatchEngine::new(rules), SessionDirectory::new());
    let config = ServiceConfig::new(args.prefix).with_nats_url(args.nats_url);

    ActionService::new(config, dispatcher).run().await?;

    info!("arena service shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["arena_app"]);
        assert_eq!(args.prefix, "arena");
        assert!(args.rules.is_none());
    }

    #[test]
    fn test_missing_rules_file_is_an_error() {
        assert!(load_rules(Some(Path::new("/nonexistent/rules.json"))).is_err());
    }

    #[test]
    fn test_unplayable_rules_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("arena-rules-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "map_limits": { "min_side": 1, "max_side": 32 } }"#).unwrap();
        let err = load_rules(Some(&path)).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(format!("{err:#}").contains("min_side"));
    }

    #[test]
    fn test_no_rules_file_uses_defaults() {
        let rules = load_rules(None).unwrap();
        assert_eq!(rules.units.len(), RulesConfig::default().units.len());
    }
}
