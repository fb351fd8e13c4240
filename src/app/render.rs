use crate::core::transfer::{TransferJob, TransferStatus};
use crate::domain::model::{CsvPreview, Passport, RepairEntry};
use chrono::NaiveDateTime;
use std::fmt::Write;

pub fn format_date(date: Option<NaiveDateTime>) -> String {
    match date {
        Some(date) => date.format("%Y-%m-%d %H:%M").to_string(),
        None => "N/A".to_string(),
    }
}

fn or_na(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => "N/A",
    }
}

pub fn passport_summary(passport: &Passport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Passport #{}: {}",
        passport.id,
        or_na(passport.product_name.as_deref())
    );
    let _ = writeln!(out, "  Manufacturer:       {}", or_na(passport.manufacturer.as_deref()));
    let _ = writeln!(out, "  Serial number:      {}", or_na(passport.serial_number.as_deref()));
    let _ = writeln!(out, "  Manufacturing date: {}", format_date(passport.manufacturing_date));
    let _ = writeln!(out, "  Product type:       {}", or_na(passport.product_type.as_deref()));
    let _ = writeln!(out, "  Model number:       {}", or_na(passport.model_number.as_deref()));

    let csv = match passport.csv_file_name.as_deref() {
        Some(name) if passport.has_csv_file() && passport.encrypted => {
            format!("{} (encrypted)", name)
        }
        Some(name) if passport.has_csv_file() => name.to_string(),
        _ => "none attached".to_string(),
    };
    let _ = writeln!(out, "  Material data:      {}", csv);
    out.push('\n');
    out.push_str(&repair_history(&passport.repair_history));
    out
}

pub fn repair_history(entries: &[RepairEntry]) -> String {
    if entries.is_empty() {
        return "Repair history: No repair history available.\n".to_string();
    }

    let mut out = format!("Repair history ({}):\n", entries.len());
    for entry in entries {
        let _ = writeln!(
            out,
            "  - {} [{}] {} (technician: {})",
            format_date(entry.repair_date),
            or_na(entry.repair_type.as_deref()),
            or_na(entry.description.as_deref()),
            or_na(entry.technician.as_deref()),
        );
    }
    out
}

pub fn passport_table(passports: &[Passport]) -> String {
    if passports.is_empty() {
        return "No passports found.\n".to_string();
    }

    let mut out = format!(
        "{:<6} {:<28} {:<20} {:<16} {:<8}\n",
        "ID", "Product", "Manufacturer", "Serial", "Repairs"
    );
    for passport in passports {
        let _ = writeln!(
            out,
            "{:<6} {:<28} {:<20} {:<16} {:<8}",
            passport.id,
            or_na(passport.product_name.as_deref()),
            or_na(passport.manufacturer.as_deref()),
            or_na(passport.serial_number.as_deref()),
            passport.repair_history.len()
        );
    }
    out
}

/// 傳輸進度列
pub fn transfer_progress(job: &TransferJob, max_attempts: u32) -> String {
    match job.status() {
        TransferStatus::Initiated => format!("Initiating EDC transfer for {}...", job.product_id()),
        TransferStatus::Checking => format!(
            "Transferring... (attempt {}/{})",
            job.attempt().min(max_attempts),
            max_attempts
        ),
        TransferStatus::Complete => "Transfer complete".to_string(),
        TransferStatus::Failed => format!("Transfer failed: {}", job.error().unwrap_or("unknown error")),
    }
}

const PASSPORT_KEYS: &[&str] = &["id", "productName"];

/// 顯示 EDC 取得的資料；帶有護照欄位才當護照呈現，否則輸出原始 JSON
pub fn transferred_passport(payload: &serde_json::Value) -> String {
    let looks_like_passport = payload
        .as_object()
        .is_some_and(|fields| PASSPORT_KEYS.iter().all(|key| fields.contains_key(*key)));

    if looks_like_passport {
        if let Ok(passport) = serde_json::from_value::<Passport>(payload.clone()) {
            return passport_summary(&passport);
        }
    }
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
}

pub fn csv_preview(preview: &CsvPreview) -> String {
    let mut out = format!(
        "CSV: {} column(s), {} row(s)\n  {}\n",
        preview.headers.len(),
        preview.row_count,
        preview.headers.join(" | ")
    );
    for row in &preview.sample_rows {
        let _ = writeln!(out, "  {}", row.join(" | "));
    }
    if preview.row_count > preview.sample_rows.len() {
        let _ = writeln!(out, "  ... {} more", preview.row_count - preview.sample_rows.len());
    }
    out
}
