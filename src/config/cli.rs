use crate::app::dashboards::parse_form_date;
use crate::config::toml_config::{DashboardConfig, LogFormat};
use crate::domain::model::{NewPassport, NewRepairEntry};
use crate::utils::error::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "dpp-dashboard")]
#[command(about = "Digital Product Passport dashboard for operators, repair shops and customers")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override backend.base_url
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Override transfer.max_attempts
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Override transfer.poll_interval_ms
    #[arg(long, global = true)]
    pub poll_interval_ms: Option<u64>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Economic operator view
    Operator {
        #[command(subcommand)]
        action: OperatorCommand,
    },
    /// Repair shop view
    Repair {
        #[command(subcommand)]
        action: RepairCommand,
    },
    /// Customer view
    Customer {
        #[command(subcommand)]
        action: CustomerCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum OperatorCommand {
    /// List all passports
    List,
    /// Show one passport
    Show { id: String },
    /// Create a passport
    Create(PassportArgs),
    /// Add a repair entry to a passport
    AddRepair {
        passport_id: i64,
        #[command(flatten)]
        repair: RepairArgs,
    },
    /// Attach a CSV material file to a passport
    Upload {
        passport_id: i64,
        file: PathBuf,
        /// Store the file unencrypted (encryption is on by default)
        #[arg(long = "no-encrypt", action = ArgAction::SetFalse)]
        encrypt: bool,
    },
    /// Download the CSV material file of a passport
    Download {
        passport_id: i64,
        /// Directory to save the file into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Show whether the backend encrypts CSV uploads
    EncryptionStatus,
}

#[derive(Debug, Clone, Subcommand)]
pub enum RepairCommand {
    /// Look up a passport by id
    Search { id: String },
    /// Log a repair and show the refreshed passport
    AddRepair {
        passport_id: String,
        #[command(flatten)]
        repair: RepairArgs,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum CustomerCommand {
    /// Look up a passport by product id
    Search { product_id: String },
    /// Look up a passport by serial number
    Serial { serial_number: String },
    /// Retrieve a passport through the EDC connector
    Edc { product_id: String },
}

#[derive(Debug, Clone, Args)]
pub struct PassportArgs {
    #[arg(long)]
    pub product_name: String,
    #[arg(long)]
    pub manufacturer: String,
    #[arg(long)]
    pub serial_number: String,
    /// Date or date-time, e.g. 2024-03-01 or 2024-03-01T10:00; defaults to now
    #[arg(long)]
    pub manufacturing_date: Option<String>,
    #[arg(long, default_value = "")]
    pub product_type: String,
    #[arg(long, default_value = "")]
    pub model_number: String,
}

#[derive(Debug, Clone, Args)]
pub struct RepairArgs {
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub repair_type: String,
    #[arg(long)]
    pub technician: String,
    /// Date or date-time; defaults to now
    #[arg(long)]
    pub date: Option<String>,
}

impl PassportArgs {
    pub fn to_form(&self) -> Result<NewPassport> {
        Ok(NewPassport {
            product_name: self.product_name.clone(),
            manufacturer: self.manufacturer.clone(),
            serial_number: self.serial_number.clone(),
            manufacturing_date: parse_form_date(self.manufacturing_date.as_deref())?,
            product_type: self.product_type.clone(),
            model_number: self.model_number.clone(),
        })
    }
}

impl RepairArgs {
    pub fn to_form(&self) -> Result<NewRepairEntry> {
        Ok(NewRepairEntry {
            repair_date: parse_form_date(self.date.as_deref())?,
            description: self.description.clone(),
            repair_type: self.repair_type.clone(),
            technician: self.technician.clone(),
        })
    }
}

impl CliConfig {
    /// 載入設定檔（若有）並套用命令列覆蓋
    pub fn resolve(&self) -> Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::from_file(path)?,
            None => DashboardConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.backend.base_url = base_url.clone();
        }
        if let Some(max_attempts) = self.max_attempts {
            config.transfer.max_attempts = max_attempts;
        }
        if let Some(interval) = self.poll_interval_ms {
            config.transfer.poll_interval_ms = interval;
        }
        if self.json_logs {
            config.logging.format = LogFormat::Json;
        }

        Ok(config)
    }
}
