// File: line_mode.rs
// Location: /src/line_mode.rs

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::qr::{self, QrEncoder, QrRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Generated(PathBuf),
    MissingUrl,
    Failed(String),
}

impl LineOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            LineOutcome::Generated(_) => 0,
            LineOutcome::MissingUrl | LineOutcome::Failed(_) => 1,
        }
    }
}

/// Runs one non-interactive generation. Prompts once on `input` when `url` is
/// absent; all messages go to `out`.
pub fn run<R: BufRead, W: Write>(
    encoder: &QrEncoder,
    url: Option<String>,
    output: Option<PathBuf>,
    mut input: R,
    mut out: W,
) -> LineOutcome {
    let url = match url.filter(|u| !u.is_empty()) {
        Some(url) => url,
        None => prompt_url(&mut input, &mut out),
    };

    let Ok(request) = QrRequest::new(&url, None) else {
        let _ = writeln!(out, "Error: No URL provided");
        return LineOutcome::MissingUrl;
    };

    let path = output.unwrap_or_else(|| PathBuf::from(qr::default_output_name(&request.url)));
    let request = QrRequest {
        output_path: Some(path.clone()),
        ..request
    };

    match encoder.encode(&request) {
        Ok(_) => {
            let _ = writeln!(out, "Saved: {}", path.display());
            let _ = writeln!(out, "Generated");
            LineOutcome::Generated(path)
        }
        Err(e) => {
            log::error!("Line mode generation failed: {}", e);
            let _ = writeln!(out, "Error: {}", e);
            LineOutcome::Failed(e.to_string())
        }
    }
}

fn prompt_url<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> String {
    let _ = write!(out, "Enter URL: ");
    let _ = out.flush();

    let mut line = String::new();
    if let Err(e) = input.read_line(&mut line) {
        log::warn!("Failed to read URL from input: {}", e);
        return String::new();
    }
    line.trim().to_string()
}
