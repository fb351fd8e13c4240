use clap::Parser;
use dpp_dashboard::app::render;
use dpp_dashboard::config::cli::{Command, CustomerCommand, OperatorCommand, RepairCommand};
use dpp_dashboard::core::transfer::TransferJob;
use dpp_dashboard::core::ConfigProvider;
use dpp_dashboard::utils::error::ErrorSeverity;
use dpp_dashboard::utils::{logger, validation::Validate};
use dpp_dashboard::{
    CliConfig, CustomerDashboard, DashboardConfig, DppError, HttpBackend, LocalStorage,
    OperatorDashboard, PollPolicy, RepairShopDashboard, Result,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    // 初始化日誌
    logger::init_logger(cli.verbose, config.logging.level.as_deref(), config.logging.format);
    tracing::debug!("Resolved config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        exit_with(&e);
    }

    Ok(())
}

async fn run(command: Command, config: &DashboardConfig) -> Result<()> {
    let backend = Arc::new(HttpBackend::new(config)?);
    tracing::info!("🌐 Using passport backend at {}", backend.base_url());

    match command {
        Command::Operator { action } => {
            let operator =
                OperatorDashboard::new(backend, LocalStorage::new(""), config.refresh_delay());
            run_operator(operator, action).await
        }
        Command::Repair { action } => {
            run_repair(RepairShopDashboard::new(backend, config.refresh_delay()), action).await
        }
        Command::Customer { action } => {
            let policy = PollPolicy::from_config(config);
            run_customer(CustomerDashboard::new(backend, policy), action).await
        }
    }
}

async fn run_operator(
    operator: OperatorDashboard<HttpBackend, LocalStorage>,
    action: OperatorCommand,
) -> Result<()> {
    match action {
        OperatorCommand::List => {
            print!("{}", render::passport_table(&operator.list_passports().await?));
        }
        OperatorCommand::Show { id } => {
            print!("{}", render::passport_summary(&operator.passport_detail(&id).await?));
        }
        OperatorCommand::Create(args) => {
            let created = operator.create_passport(&args.to_form()?).await?;
            println!("✅ Passport created");
            print!("{}", render::passport_summary(&created));
        }
        OperatorCommand::AddRepair {
            passport_id,
            repair,
        } => {
            let updated = operator.add_repair(passport_id, &repair.to_form()?).await?;
            println!("✅ Repair entry added");
            print!("{}", render::repair_history(&updated.repair_history));
        }
        OperatorCommand::Upload {
            passport_id,
            file,
            encrypt,
        } => {
            let report = operator.upload_csv(passport_id, &file, encrypt).await?;
            print!("{}", render::csv_preview(&report.preview));
            if report.outcome.encryption_enabled {
                println!("✅ File uploaded and encrypted");
            } else {
                println!("✅ File uploaded");
            }
        }
        OperatorCommand::Download {
            passport_id,
            output,
        } => {
            let written = operator.download_csv(passport_id, &output).await?;
            println!("📁 Saved to: {}", written);
        }
        OperatorCommand::EncryptionStatus => {
            let status = operator.encryption_status().await?;
            let state = if status.csv_encryption_enabled {
                "enabled"
            } else {
                "disabled"
            };
            println!("🔒 CSV encryption is {}", state);
        }
    }
    Ok(())
}

async fn run_repair(shop: RepairShopDashboard<HttpBackend>, action: RepairCommand) -> Result<()> {
    match action {
        RepairCommand::Search { id } => {
            print!("{}", render::passport_summary(&shop.search_passport(&id).await?));
        }
        RepairCommand::AddRepair {
            passport_id,
            repair,
        } => {
            let refreshed = shop.add_repair(&passport_id, &repair.to_form()?).await?;
            println!("✅ Repair entry added");
            print!("{}", render::passport_summary(&refreshed));
        }
    }
    Ok(())
}

async fn run_customer(mut customer: CustomerDashboard<HttpBackend>, action: CustomerCommand) -> Result<()> {
    match action {
        CustomerCommand::Search { product_id } => {
            print!("{}", render::passport_summary(&customer.search_passport(&product_id).await?));
        }
        CustomerCommand::Serial { serial_number } => {
            print!("{}", render::passport_summary(&customer.search_by_serial(&serial_number).await?));
        }
        CustomerCommand::Edc { product_id } => {
            let max_attempts = customer.policy().max_attempts;
            let mut last_line = String::new();
            let print_progress = |job: &TransferJob| {
                let line = render::transfer_progress(job, max_attempts);
                if line != last_line {
                    eprintln!("⏳ {}", line);
                    last_line = line;
                }
            };

            // Ctrl-C 取消傳輸
            let finished = tokio::select! {
                outcome = customer.retrieve_via_edc(&product_id, print_progress) => Some(outcome),
                _ = tokio::signal::ctrl_c() => None,
            };
            let Some(outcome) = finished else {
                customer.cancel_edc_transfer();
                return Err(DppError::Cancelled);
            };

            let outcome = outcome?;
            tracing::info!(
                "✅ Retrieved passport for {} after {} attempt(s)",
                outcome.product_id,
                outcome.attempts
            );
            print!("{}", render::transferred_passport(&outcome.passport));
        }
    }
    Ok(())
}

/// 根據錯誤嚴重程度決定退出碼
fn exit_with(e: &DppError) -> ! {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
