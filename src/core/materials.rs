use crate::domain::model::CsvPreview;
use crate::utils::error::{DppError, Result};

/// 解析 CSV 材料檔：表頭、資料列數與前幾列樣本
pub fn preview_csv(data: &[u8], sample_size: usize) -> Result<CsvPreview> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|header| header.is_empty()) {
        return Err(DppError::validation("The selected CSV file is empty"));
    }

    let mut row_count = 0;
    let mut sample_rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        row_count += 1;
        if sample_rows.len() < sample_size {
            sample_rows.push(record.iter().map(str::to_string).collect());
        }
    }

    tracing::debug!(
        "CSV preview: {} columns, {} rows",
        headers.len(),
        row_count
    );

    Ok(CsvPreview {
        headers,
        row_count,
        sample_rows,
    })
}
