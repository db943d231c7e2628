use crate::config::toml_config::TomlConfig;
use crate::config::BackendSettings;
use crate::domain::model::{RateFilter, RateId, RateType};
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "freight-rates")]
#[command(about = "Save, list and delete your freight rates on a hosted backend")]
pub struct CliConfig {
    #[arg(long, global = true, help = "TOML config file with a [backend] section")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Backend project URL")]
    pub url: Option<String>,

    #[arg(long, global = true, help = "Project API key")]
    pub api_key: Option<String>,

    #[arg(long, global = true, help = "Access token of the signed-in user")]
    pub access_token: Option<String>,

    #[arg(long, global = true, help = "Rates table name")]
    pub table: Option<String>,

    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Save a new rate from form fields
    Save {
        rate_type: RateType,

        /// Form field as name=value, repeatable (e.g. -f origin_port=TRPOT)
        #[arg(short = 'f', long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// List your rates, newest first
    List {
        #[arg(long, default_value = "all")]
        filter: RateFilter,
    },
    /// Delete a rate by id
    Delete { id: RateId },
    /// Write your rates as CSV
    Export {
        #[arg(long, default_value = "all")]
        filter: RateFilter,

        #[arg(short, long)]
        output: PathBuf,
    },
}

fn parse_field(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("field name missing in '{}'", raw));
    }
    Ok((name.to_string(), value.to_string()))
}

impl CliConfig {
    pub fn load_file(&self) -> Result<Option<TomlConfig>> {
        self.config.as_ref().map(TomlConfig::from_file).transpose()
    }

    /// Flags win over the config file, the file over `FREIGHT_RATES_*` variables.
    pub fn settings(&self, file: Option<&TomlConfig>) -> BackendSettings {
        let flags = BackendSettings {
            url: self.url.clone().unwrap_or_default(),
            api_key: self.api_key.clone().unwrap_or_default(),
            access_token: self.access_token.clone(),
            table: self.table.clone().unwrap_or_default(),
            timeout_seconds: self.timeout_seconds,
        };
        let file = file.map(BackendSettings::from_toml).unwrap_or_default();
        flags.or(file).or(BackendSettings::from_env())
    }
}

/// Collects `--field` pairs into a form; later duplicates win.
pub fn form_from_fields(fields: &[(String, String)]) -> BTreeMap<String, String> {
    fields.iter().cloned().collect()
}
