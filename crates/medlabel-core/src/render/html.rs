//! HTML label sheets sized for 4cm x 2.5cm label stock.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use super::{LabelJob, LabelRenderer, RenderError, RenderResult};
use crate::config::StationConfig;
use crate::expiry::display_expiry;

const LABEL_CSS: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { margin: 0 !important; padding: 0 !important; background: white; font-family: Arial; }
.label-container { width: 4cm !important; height: 2.5cm !important; border: 0.5px solid #000; padding: 1mm; margin: 0 !important; page-break-after: always; display: flex; flex-direction: column; overflow: hidden; }
.label-content { flex: 1; display: flex; flex-direction: column; height: 100%; }
.label-header { height: 0.4cm; display: flex; align-items: center; justify-content: space-between; padding-bottom: 0.5mm; border-bottom: 0.5px solid #000; }
.logo-image { max-height: 0.3cm; max-width: 70%; width: auto; object-fit: contain; }
.pharmacy-name { font-size: 4pt; font-weight: bold; }
.patient-id { flex: 1; text-align: right; font-size: 4pt; }
.patient-name, .drug-name { height: 0.25cm; text-align: center; margin: 0.1mm 0; padding: 0.3mm 0; line-height: 1; overflow: hidden; border-bottom: 0.5px solid #000; font-size: 5pt; }
.patient-name strong, .drug-name strong { display: block; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }
.instructions { flex: 1; min-height: 0.8cm; margin: 0.1mm 0; padding: 0.5mm; overflow: hidden; border-bottom: 0.5px solid #000; font-size: 5pt; }
.instructions span { display: block; word-wrap: break-word; line-height: 1.2; height: 100%; overflow: hidden; text-align: center; direction: rtl; }
.label-footer { height: 0.3cm; font-size: 4pt; display: flex; flex-direction: column; justify-content: space-between; padding-top: 0.2mm; }
.footer-line { display: flex; justify-content: space-between; }
.footer-date { text-align: center; }
@media print {
  @page { margin: 0 !important; padding: 0 !important; size: 4cm 2.5cm !important; }
  body { margin: 0 !important; padding: 0 !important; width: 4cm !important; height: 2.5cm !important; }
  .label-container { width: 4cm !important; height: 2.5cm !important; margin: 0 !important; padding: 1mm !important; page-break-after: always; }
}
"#;

/// Static parts of every label.
#[derive(Debug, Clone)]
pub struct HtmlLabelSheet {
    pub pharmacy_name: String,
    pub prescriber_name: String,
    pub logo_url: Option<String>,
}

impl HtmlLabelSheet {
    pub fn from_config(config: &StationConfig) -> Self {
        Self {
            pharmacy_name: config.pharmacy_name.clone(),
            prescriber_name: config.prescriber_name.clone(),
            logo_url: config.logo_url.clone(),
        }
    }

    /// Render a full HTML document dated `print_date` (DD/MM/YYYY).
    ///
    /// Each entry is repeated `print_quantity` times, in basket order.
    pub fn render_document(&self, job: &LabelJob<'_>, print_date: &str) -> String {
        let mut labels = String::new();
        for entry in job.entries {
            let expiry = display_expiry(&entry.expiry_date().unwrap_or_default());
            for _ in 0..job.print_quantity.get() {
                self.write_label(
                    &mut labels,
                    job,
                    &entry.drug_name,
                    &entry.instruction_text,
                    &expiry,
                    print_date,
                );
            }
        }

        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Medication Labels</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
            LABEL_CSS, labels
        )
    }

    fn write_label(
        &self,
        out: &mut String,
        job: &LabelJob<'_>,
        drug_name: &str,
        instruction: &str,
        expiry: &str,
        print_date: &str,
    ) {
        let brand = match &self.logo_url {
            Some(url) => format!(
                "<img src=\"{}\" alt=\"{}\" class=\"logo-image\" />",
                escape_html(url),
                escape_html(&self.pharmacy_name)
            ),
            None => format!(
                "<span class=\"pharmacy-name\">{}</span>",
                escape_html(&self.pharmacy_name)
            ),
        };

        // Writing to a String can not fail
        let _ = write!(
            out,
            concat!(
                "<div class=\"label-container\"><div class=\"label-content\">\n",
                "  <div class=\"label-header\">{brand}<div class=\"patient-id\">ID: {full_id}</div></div>\n",
                "  <div class=\"patient-name\"><strong>{patient}</strong></div>\n",
                "  <div class=\"drug-name\"><strong>{drug}</strong></div>\n",
                "  <div class=\"instructions\"><span>{instruction}</span></div>\n",
                "  <div class=\"label-footer\">\n",
                "    <div class=\"footer-line\"><span>Exp: {expiry}</span><span>By: {prescriber}</span></div>\n",
                "    <div class=\"footer-date\"><span>{date}</span></div>\n",
                "  </div>\n",
                "</div></div>\n"
            ),
            brand = brand,
            full_id = escape_html(&job.patient.full_id),
            patient = escape_html(&job.patient.name),
            drug = escape_html(drug_name),
            instruction = escape_html(instruction),
            expiry = escape_html(expiry),
            prescriber = escape_html(&self.prescriber_name),
            date = escape_html(print_date),
        );
    }
}

/// Writes each print job as `labels-<session>.html` into a directory.
#[derive(Debug, Clone)]
pub struct HtmlFileRenderer {
    out_dir: PathBuf,
    sheet: HtmlLabelSheet,
    last_output: Option<PathBuf>,
}

impl HtmlFileRenderer {
    pub fn new(out_dir: impl Into<PathBuf>, sheet: HtmlLabelSheet) -> Self {
        Self {
            out_dir: out_dir.into(),
            sheet,
            last_output: None,
        }
    }

    /// Path of the most recently written sheet.
    pub fn last_output(&self) -> Option<&Path> {
        self.last_output.as_deref()
    }
}

impl LabelRenderer for HtmlFileRenderer {
    #[instrument(
        skip(self, job),
        fields(session = %job.print_session_id, labels = job.label_count())
    )]
    fn render(&mut self, job: &LabelJob<'_>) -> RenderResult<()> {
        if job.entries.is_empty() {
            return Err(RenderError::InvalidJob("no entries to render".into()));
        }

        std::fs::create_dir_all(&self.out_dir)?;
        let print_date = chrono::Local::now().format("%d/%m/%Y").to_string();
        let document = self.sheet.render_document(job, &print_date);

        let path = self
            .out_dir
            .join(format!("labels-{}.html", job.print_session_id));
        std::fs::write(&path, document)?;

        info!(path = %path.display(), "Label sheet written");
        self.last_output = Some(path);
        Ok(())
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expiry;
    use crate::models::{BasketEntry, Patient, PatientSnapshot};
    use crate::session::PrintQuantity;

    fn sheet() -> HtmlLabelSheet {
        HtmlLabelSheet {
            pharmacy_name: "Nile Pharmacy".into(),
            prescriber_name: "Dr Mahmoud".into(),
            logo_url: None,
        }
    }

    fn patient() -> PatientSnapshot {
        Patient::new("1042".into(), "2025".into(), "Sara Ahmed".into()).snapshot()
    }

    fn entry(name: &str, month: &str, year: &str) -> BasketEntry {
        let mut e = BasketEntry::new(name.into(), "مرة يوميا".into());
        expiry::set_month(&mut e, month);
        expiry::set_year(&mut e, year);
        e
    }

    #[test]
    fn test_repeats_each_entry_per_quantity() {
        let patient = patient();
        let entries = vec![entry("Amoxicillin", "01", "26"), entry("Omeprazole", "06", "27")];
        let job = LabelJob {
            print_session_id: "S1",
            patient: &patient,
            entries: &entries,
            print_quantity: PrintQuantity::new(3, 10).unwrap(),
        };

        let html = sheet().render_document(&job, "18/10/2026");
        assert_eq!(job.label_count(), 6);
        assert_eq!(html.matches("class=\"label-container\"").count(), 6);
        assert_eq!(html.matches("Amoxicillin").count(), 3);

        // Basket order is label order
        let first_amox = html.find("Amoxicillin").unwrap();
        let first_omep = html.find("Omeprazole").unwrap();
        assert!(first_amox < first_omep);
    }

    #[test]
    fn test_label_fields() {
        let patient = patient();
        let entries = vec![entry("Amoxicillin", "01", "26")];
        let job = LabelJob {
            print_session_id: "S1",
            patient: &patient,
            entries: &entries,
            print_quantity: PrintQuantity::default(),
        };

        let html = sheet().render_document(&job, "18/10/2026");
        assert!(html.contains("ID: 1042/2025"));
        assert!(html.contains("<strong>Sara Ahmed</strong>"));
        assert!(html.contains("Exp: 01/2026"));
        assert!(html.contains("By: Dr Mahmoud"));
        assert!(html.contains("18/10/2026"));
        assert!(html.contains("مرة يوميا"));
        assert!(html.contains("Nile Pharmacy"));
    }

    #[test]
    fn test_escapes_text() {
        assert_eq!(
            escape_html("<b>\"A&B\"</b>"),
            "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;"
        );

        let patient = patient();
        let entries = vec![entry("<script>", "01", "26")];
        let job = LabelJob {
            print_session_id: "S1",
            patient: &patient,
            entries: &entries,
            print_quantity: PrintQuantity::default(),
        };
        let html = sheet().render_document(&job, "18/10/2026");
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_file_renderer_writes_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let mut renderer = HtmlFileRenderer::new(dir.path().join("labels"), sheet());

        let patient = patient();
        let entries = vec![entry("Amoxicillin", "01", "26")];
        let job = LabelJob {
            print_session_id: "S42",
            patient: &patient,
            entries: &entries,
            print_quantity: PrintQuantity::new(2, 10).unwrap(),
        };
        renderer.render(&job).unwrap();

        let path = renderer.last_output().unwrap().to_path_buf();
        assert!(path.ends_with("labels-S42.html"));
        let html = std::fs::read_to_string(path).unwrap();
        assert_eq!(html.matches("class=\"label-container\"").count(), 2);
    }

    #[test]
    fn test_file_renderer_rejects_empty_job() {
        let dir = tempfile::tempdir().unwrap();
        let mut renderer = HtmlFileRenderer::new(dir.path(), sheet());
        let patient = patient();
        let job = LabelJob {
            print_session_id: "S1",
            patient: &patient,
            entries: &[],
            print_quantity: PrintQuantity::default(),
        };
        assert!(matches!(
            renderer.render(&job),
            Err(RenderError::InvalidJob(_))
        ));
        assert!(renderer.last_output().is_none());
    }
}
