//! Downloadable artifacts: file names and the batch HTML sheet.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Local};

use crate::{batch::BatchItem, encoding::EncodingError, formats::FormatKind};

/// What is being saved, which decides the suggested file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Simple tab and multi-size preview.
    Code,
    Format(FormatKind),
    BatchSheet,
    /// Logo mode; `with_logo` is false when no logo was composed.
    Logo { with_logo: bool },
}

impl ExportKind {
    pub fn extension(self) -> &'static str {
        match self {
            Self::BatchSheet => "html",
            Self::Code | Self::Format(_) | Self::Logo { .. } => "png",
        }
    }
}

/// Suggested file name, stamped with `now` in milliseconds.
pub fn download_filename(kind: ExportKind, now: DateTime<Local>) -> String {
    let ms = now.timestamp_millis();
    match kind {
        ExportKind::Code => format!("qrcode-{ms}.png"),
        ExportKind::Format(format) => format!("qrcode-{}-{ms}.png", format.slug()),
        ExportKind::BatchSheet => format!("batch-qr-codes-{ms}.html"),
        ExportKind::Logo { with_logo: true } => format!("qr-with-logo-{ms}.png"),
        ExportKind::Logo { with_logo: false } => format!("qr-code-{ms}.png"),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const BATCH_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Batch QR Codes</title>
  <style>
    body { font-family: Arial, sans-serif; padding: 20px; }
    .qr-container { display: grid; grid-template-columns: repeat(2, 1fr); gap: 20px; margin-top: 20px; }
    .qr-item { border: 1px solid #ccc; padding: 15px; text-align: center; break-inside: avoid; }
    .qr-item img { max-width: 300px; margin: 10px 0; }
    .qr-item p { margin: 10px 0; word-break: break-all; }
    @media print { .qr-container { grid-template-columns: repeat(3, 1fr); } }
  </style>
</head>
<body>
  <h1>Generated QR Codes</h1>
  <div class="qr-container">"#;

/// Self-contained HTML page with every batch item as an inline PNG and its source text.
pub fn batch_html(items: &[BatchItem]) -> Result<String, EncodingError> {
    let mut html = String::from(BATCH_HEAD);
    for item in items {
        let png = item.image.to_png()?;
        html.push_str(&format!(
            r#"
    <div class="qr-item">
      <img src="data:image/png;base64,{}" alt="QR Code">
      <p><strong>{}</strong></p>
    </div>"#,
            STANDARD.encode(png),
            escape_html(&item.text)
        ));
    }
    html.push_str("\n  </div>\n</body>\n</html>\n");
    Ok(html)
}
