//! PDF export of the current diagnosis.
//!
//! Layout is a single column of Helvetica text on A4; a new page starts when
//! the cursor reaches the bottom margin.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::domain::{Condition, Gender, ScoringInput, ScoringResult, FEATURE_NAMES};
use crate::VitaliaError;

/// File name of the exported report.
pub const REPORT_FILENAME: &str = "Clinical_Report.pdf";

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const TOP: Mm = Mm(280.0);
const BOTTOM_MARGIN: Mm = Mm(20.0);
const LEFT: Mm = Mm(20.0);

/// Text content of one clinical report.
#[derive(Debug, Clone, PartialEq)]
pub struct ClinicalReport {
    pub date: NaiveDate,
    pub gender: Gender,
    pub age: f64,
    pub condition: Condition,
    pub glucose: f64,
    pub bmi: f64,
    pub pressure: f64,
    pub result: ScoringResult,
    pub features: [f64; 4],
}

impl ClinicalReport {
    #[must_use]
    pub fn new(input: &ScoringInput, result: &ScoringResult, date: NaiveDate) -> Self {
        Self {
            date,
            gender: input.gender,
            age: input.age,
            condition: input.condition,
            glucose: input.glucose,
            bmi: input.bmi,
            pressure: input.pressure,
            result: result.clone(),
            features: input.features().0,
        }
    }

    #[must_use]
    pub fn title(&self) -> String {
        format!("VitalIA Report - {}", self.date.format("%Y-%m-%d"))
    }

    /// Body lines in print order, with the font size for each.
    #[must_use]
    pub fn body(&self) -> Vec<(String, f32)> {
        let mut lines = vec![
            (format!("Patient: {}, {} years", self.gender, self.age), 11.0),
            (format!("Comorbidity: {}", self.condition.label()), 11.0),
            (
                format!(
                    "Diagnosis: {} ({}%)",
                    self.result.level.label(),
                    self.result.score
                ),
                12.0,
            ),
            (format!("Recommendation: {}", self.result.recommendation), 10.0),
            (String::new(), 10.0),
            ("Biometrics".to_string(), 11.0),
            (format!("Glucose: {} mg/dL", self.glucose), 10.0),
            (format!("BMI: {}", self.bmi), 10.0),
            (format!("Blood pressure: {} mmHg", self.pressure), 10.0),
            (String::new(), 10.0),
            ("Normalized features".to_string(), 11.0),
        ];
        lines.extend(
            FEATURE_NAMES
                .iter()
                .zip(self.features)
                .map(|(name, value)| (format!("{name}: {value:.3}"), 10.0)),
        );
        lines.push((String::new(), 10.0));
        lines.push((
            "Decision support only. Not a substitute for clinical judgement.".to_string(),
            8.0,
        ));
        lines
    }
}

/// Render a report to PDF bytes.
///
/// # Errors
/// Returns `VitaliaError::Export` if the document cannot be built.
pub fn render_pdf(report: &ClinicalReport) -> Result<Vec<u8>, VitaliaError> {
    render_lines(&report.title(), &report.body())
}

/// Render the report and write it as `Clinical_Report.pdf` under `dir`.
///
/// # Errors
/// Returns an error if rendering fails or the file cannot be written.
pub fn write_report(report: &ClinicalReport, dir: &Path) -> Result<PathBuf, VitaliaError> {
    let bytes = render_pdf(report)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(REPORT_FILENAME);
    std::fs::write(&path, bytes)?;
    tracing::info!("Clinical report written to {:?}", path);
    Ok(path)
}

fn render_lines(title: &str, lines: &[(String, f32)]) -> Result<Vec<u8>, VitaliaError> {
    let (doc, page1, layer1) = PdfDocument::new(title, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| VitaliaError::Export(format!("PDF font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| VitaliaError::Export(format!("PDF font error: {e}")))?;

    let mut layer: PdfLayerReference = doc.get_page(page1).get_layer(layer1);
    let mut y = TOP;

    layer.use_text(title, 16.0, LEFT, y, &bold);
    y -= Mm(12.0);

    for (text, size) in lines {
        if y < BOTTOM_MARGIN {
            let (page, page_layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
            layer = doc.get_page(page).get_layer(page_layer);
            y = TOP;
        }
        if !text.is_empty() {
            let face: &IndirectFontRef = if *size >= 11.0 { &bold } else { &font };
            layer.use_text(text.as_str(), *size, LEFT, y, face);
        }
        y -= line_height(*size);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| VitaliaError::Export(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| VitaliaError::Export(format!("PDF buffer error: {e}")))
}

fn line_height(size: f32) -> Mm {
    Mm(size * 0.6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RiskLevel;
    use tempfile::tempdir;

    fn sample_report() -> ClinicalReport {
        let input = ScoringInput::new(45.0, 90.0, 24.0, 120.0, Gender::Male, Condition::DiabetesT2)
            .expect("valid input");
        let result = ScoringResult::classify(0, Condition::DiabetesT2, 24.0);
        let date = NaiveDate::from_ymd_opt(2025, 10, 12).expect("date");
        ClinicalReport::new(&input, &result, date)
    }

    #[test]
    fn test_report_lines() {
        let report = sample_report();
        assert_eq!(report.title(), "VitalIA Report - 2025-10-12");

        let body: Vec<String> = report.body().into_iter().map(|(t, _)| t).collect();
        assert_eq!(body[0], "Patient: Male, 45 years");
        assert_eq!(body[1], "Comorbidity: Diabetes T2");
        assert_eq!(body[2], "Diagnosis: MODERATE (CHRONIC) (45%)");
        assert!(body
            .iter()
            .any(|l| l.contains(RiskLevel::ModerateChronic.recommendation())));
        assert!(body.iter().any(|l| l == "Age: 0.450"));
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render_pdf(&sample_report()).expect("render");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_documents_paginate() {
        let lines: Vec<(String, f32)> = (0..200).map(|i| (format!("line {i}"), 10.0)).collect();
        let bytes = render_lines("Long report", &lines).expect("render");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_write_report_to_directory() {
        let temp = tempdir().expect("tempdir");
        let out_dir = temp.path().join("reports");
        let path = write_report(&sample_report(), &out_dir).expect("write");
        assert_eq!(path, out_dir.join(REPORT_FILENAME));
        let bytes = std::fs::read(&path).expect("read back");
        assert!(bytes.starts_with(b"%PDF"));
    }
}
