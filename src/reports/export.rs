//! File exports of a report range: CSV and JSON by hand/serde, XLSX through
//! rust_xlsxwriter and PDF through printpdf.

use std::str::FromStr;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde::{Deserialize, Serialize};

use super::summary::MonthlyReport;
use crate::database::models::Transaction;
use crate::error::{AppError, Result};
use crate::util::{fmt_money, iso};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Pdf => "application/pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "pdf" => Ok(Self::Pdf),
            other => Err(format!("Unknown export format: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Serialize)]
struct JsonExport<'a> {
    report: &'a MonthlyReport,
    transactions: &'a [Transaction],
}

pub fn export_report(
    report: &MonthlyReport,
    transactions: &[Transaction],
    format: ExportFormat,
) -> Result<ExportFile> {
    let bytes = match format {
        ExportFormat::Csv => to_csv(transactions).into_bytes(),
        ExportFormat::Json => serde_json::to_vec_pretty(&JsonExport { report, transactions })
            .map_err(|e| AppError::Export(e.to_string()))?,
        ExportFormat::Xlsx => to_xlsx(report, transactions).map_err(|e| AppError::Export(e.to_string()))?,
        ExportFormat::Pdf => to_pdf(report)?,
    };

    Ok(ExportFile {
        file_name: format!(
            "report_{}_{}.{}",
            iso(&report.from),
            iso(&report.to),
            format.extension()
        ),
        content_type: format.content_type(),
        bytes,
    })
}

fn kind_label(t: &Transaction) -> &'static str {
    if t.is_expense {
        "expense"
    } else {
        "income"
    }
}

fn to_csv(transactions: &[Transaction]) -> String {
    let mut csv = String::from("date,category,description,type,amount\n");
    for t in transactions {
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            iso(&t.transacted_at),
            escape_csv(t.category_name.as_deref().unwrap_or("")),
            escape_csv(t.description.as_deref().unwrap_or("")),
            kind_label(t),
            fmt_money(&t.amount)
        ));
    }
    csv
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn money_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &rust_decimal::Decimal,
) -> std::result::Result<(), XlsxError> {
    sheet.write_number(row, col, value.to_f64().unwrap_or(0.0))?;
    Ok(())
}

fn to_xlsx(report: &MonthlyReport, transactions: &[Transaction]) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        for (col, header) in ["Month", "Income", "Expenses", "Net"].iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *header, &bold)?;
        }
        let mut row = 1;
        for month in &report.months {
            sheet.write_string(row, 0, month.month.as_str())?;
            money_cell(sheet, row, 1, &month.income)?;
            money_cell(sheet, row, 2, &month.expenses)?;
            money_cell(sheet, row, 3, &month.net)?;
            row += 1;
        }
        sheet.write_string_with_format(row, 0, "Total", &bold)?;
        money_cell(sheet, row, 1, &report.total_income)?;
        money_cell(sheet, row, 2, &report.total_expenses)?;
        money_cell(sheet, row, 3, &report.net)?;

        row += 2;
        for (col, header) in ["Category", "Spent", "Share %"].iter().enumerate() {
            sheet.write_string_with_format(row, col as u16, *header, &bold)?;
        }
        for category in &report.expenses_by_category {
            row += 1;
            sheet.write_string(row, 0, category.category.as_str())?;
            money_cell(sheet, row, 1, &category.total)?;
            money_cell(sheet, row, 2, &category.share)?;
        }
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Transactions")?;
        for (col, header) in ["Date", "Category", "Description", "Type", "Amount"].iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *header, &bold)?;
        }
        for (i, t) in transactions.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_string(row, 0, iso(&t.transacted_at))?;
            sheet.write_string(row, 1, t.category_name.as_deref().unwrap_or(""))?;
            sheet.write_string(row, 2, t.description.as_deref().unwrap_or(""))?;
            sheet.write_string(row, 3, kind_label(t))?;
            money_cell(sheet, row, 4, &t.amount)?;
        }
    }

    workbook.save_to_buffer()
}

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 6.0;

/// Writes lines top to bottom, starting a new A4 page when the bottom margin is reached.
struct PdfWriter {
    doc: printpdf::PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::Export(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::Export(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            font,
            bold,
            y: PAGE_HEIGHT - MARGIN,
        })
    }

    fn line(&mut self, text: &str, size: f32, bold: bool) {
        if self.y < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
        let font = if bold { &self.bold } else { &self.font };
        self.layer.use_text(text, size, Mm(MARGIN), Mm(self.y), font);
        self.y -= LINE_HEIGHT;
    }

    fn gap(&mut self) {
        self.y -= LINE_HEIGHT;
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.doc.save_to_bytes().map_err(|e| AppError::Export(e.to_string()))
    }
}

fn to_pdf(report: &MonthlyReport) -> Result<Vec<u8>> {
    let title = format!("Financial report {} to {}", iso(&report.from), iso(&report.to));
    let mut pdf = PdfWriter::new(&title)?;

    pdf.line(&title, 16.0, true);
    pdf.gap();
    pdf.line(&format!("Income:   {}", fmt_money(&report.total_income)), 11.0, false);
    pdf.line(&format!("Expenses: {}", fmt_money(&report.total_expenses)), 11.0, false);
    pdf.line(&format!("Net:      {}", fmt_money(&report.net)), 11.0, false);
    pdf.gap();

    pdf.line("By month", 13.0, true);
    for month in &report.months {
        pdf.line(
            &format!(
                "{}   income {}   expenses {}   net {}",
                month.month,
                fmt_money(&month.income),
                fmt_money(&month.expenses),
                fmt_money(&month.net)
            ),
            10.0,
            false,
        );
    }
    pdf.gap();

    pdf.line("Expenses by category", 13.0, true);
    for category in &report.expenses_by_category {
        pdf.line(
            &format!(
                "{}   {}   ({}%)",
                category.category,
                fmt_money(&category.total),
                category.share
            ),
            10.0,
            false,
        );
    }

    pdf.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::summary::monthly_report;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn transactions() -> Vec<Transaction> {
        vec![
            Transaction {
                id: 1,
                category_id: Some(1),
                category_name: Some("Food, Drink".into()),
                amount: Decimal::new(1250, 2),
                is_expense: true,
                description: Some("Lunch \"deluxe\"".into()),
                transacted_at: date(2024, 5, 3),
                created_at: date(2024, 5, 3).and_hms_opt(12, 0, 0).unwrap(),
            },
            Transaction {
                id: 2,
                category_id: None,
                category_name: None,
                amount: Decimal::from(2000),
                is_expense: false,
                description: None,
                transacted_at: date(2024, 5, 1),
                created_at: date(2024, 5, 1).and_hms_opt(9, 0, 0).unwrap(),
            },
        ]
    }

    #[test]
    fn csv_escaping_quotes_only_when_needed() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn csv_has_header_and_one_row_per_transaction() {
        let csv = to_csv(&transactions());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,category,description,type,amount");
        assert_eq!(
            lines[1],
            "2024-05-03,\"Food, Drink\",\"Lunch \"\"deluxe\"\"\",expense,12.50"
        );
        assert_eq!(lines[2], "2024-05-01,,,income,2000.00");
    }

    #[test]
    fn every_format_produces_a_named_file() {
        let txns = transactions();
        let report = monthly_report(&txns, date(2024, 5, 1), date(2024, 5, 31));

        let json = export_report(&report, &txns, ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json.bytes).unwrap();
        assert_eq!(value["transactions"].as_array().unwrap().len(), 2);
        assert_eq!(json.file_name, "report_2024-05-01_2024-05-31.json");

        let xlsx = export_report(&report, &txns, ExportFormat::Xlsx).unwrap();
        // xlsx files are zip archives
        assert!(xlsx.bytes.starts_with(b"PK"));

        let pdf = export_report(&report, &txns, ExportFormat::Pdf).unwrap();
        assert!(pdf.bytes.starts_with(b"%PDF"));
        assert_eq!(pdf.content_type, "application/pdf");
    }

    #[test]
    fn format_names_parse() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("excel".parse::<ExportFormat>(), Ok(ExportFormat::Xlsx));
        assert!("docx".parse::<ExportFormat>().is_err());
    }
}
