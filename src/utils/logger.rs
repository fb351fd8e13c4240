use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::toml_config::LogFormat;

fn default_filter(verbose: bool, level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { level.unwrap_or("info") };
        EnvFilter::new(format!("dpp_dashboard={},warn", level))
    })
}

pub fn init_logger(verbose: bool, level: Option<&str>, format: LogFormat) {
    let filter = default_filter(verbose, level);
    let registry = tracing_subscriber::registry().with(filter);

    // 日誌寫到 stderr，stdout 留給畫面輸出
    match format {
        LogFormat::Compact => {
            let _ = registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .compact(),
                )
                .try_init();
        }
        LogFormat::Json => {
            let _ = registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .json(),
                )
                .try_init();
        }
    }
}
