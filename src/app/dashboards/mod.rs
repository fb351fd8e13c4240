pub mod customer;
pub mod operator;
pub mod repair_shop;

pub use customer::CustomerDashboard;
pub use operator::OperatorDashboard;
pub use repair_shop::RepairShopDashboard;

use crate::core::{PassportApi, Result};
use crate::domain::model::{NewRepairEntry, Passport};
use crate::utils::error::DppError;
use crate::utils::validation::require_input;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// 解析表單日期；空白代表「現在」由呼叫端補上
pub fn parse_form_date(input: Option<&str>) -> Result<Option<NaiveDateTime>> {
    let Some(raw) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if let Ok(date_time) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(date_time.naive_utc()));
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(date_time) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(date_time));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0));
    }

    Err(DppError::validation(format!(
        "Invalid date '{}'. Use YYYY-MM-DD or YYYY-MM-DDTHH:MM",
        raw
    )))
}

pub(crate) fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

pub(crate) fn validate_repair(repair: &NewRepairEntry) -> Result<NewRepairEntry> {
    Ok(NewRepairEntry {
        repair_date: Some(repair.repair_date.unwrap_or_else(now)),
        description: require_input(&repair.description, "Please enter a repair description")?
            .to_string(),
        repair_type: require_input(&repair.repair_type, "Please enter a repair type")?.to_string(),
        technician: require_input(&repair.technician, "Please enter a technician")?.to_string(),
    })
}

/// "503 Service Unavailable" 形式的狀態文字
pub(crate) fn status_text(status: u16) -> String {
    match reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
    {
        Some(reason) => format!("{} {}", status, reason),
        None => status.to_string(),
    }
}

/// 後端失敗改用畫面訊息；輸入驗證錯誤原樣保留
pub(crate) fn action_failed(message: &str) -> impl FnOnce(DppError) -> DppError + '_ {
    move |e| match e {
        DppError::ValidationError { .. } => e,
        other => {
            tracing::warn!("{}: {}", message, other);
            DppError::ActionError {
                message: message.to_string(),
            }
        }
    }
}

/// 新增維修失敗時帶上 HTTP 狀態
pub(crate) fn repair_failed(e: DppError) -> DppError {
    match e {
        DppError::ApiError { status, message } => {
            tracing::warn!("Repair rejected by backend: {}", message);
            DppError::ActionError {
                message: format!("Failed to add repair entry: {}", status_text(status)),
            }
        }
        other => other,
    }
}

/// 依 ID 查詢護照，404 與其他失敗轉成畫面上的訊息
pub(crate) async fn lookup_passport<B: PassportApi + ?Sized>(
    backend: &B,
    id: &str,
    failure_message: &str,
) -> Result<Passport> {
    let id = require_input(id, "Please enter a product ID")?;

    match backend.passport_detail(id).await {
        Ok(passport) => Ok(passport),
        Err(DppError::NotFound { .. }) => Err(DppError::LookupError {
            message: "Product not found. Please check the ID and try again.".to_string(),
        }),
        Err(e) => {
            tracing::warn!("Passport lookup for {} failed: {}", id, e);
            Err(DppError::LookupError {
                message: failure_message.to_string(),
            })
        }
    }
}
