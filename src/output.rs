//! Output — renders accepted records as lines on stdout.

use logdrop_core::LogRecord;

/// How each record is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One compact JSON object per line.
    #[default]
    Json,
    /// `<time> <S> <pid>/<tid> <peer> - <message>`, for humans.
    Pretty,
}

impl OutputFormat {
    /// Render `record` as a single line, without the trailing newline.
    pub fn render(&self, record: &LogRecord) -> serde_json::Result<String> {
        match self {
            OutputFormat::Json => serde_json::to_string(record),
            OutputFormat::Pretty => Ok(render_pretty(record)),
        }
    }
}

fn render_pretty(record: &LogRecord) -> String {
    let time = match record.datetime() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S%.6f UTC").to_string(),
        None => "-".to_string(),
    };
    let message = record.message.replace(['\r', '\n'], " ");

    format!(
        "{time} {} {:>6}/{:#014x} {} - {message}",
        record.severity.initial(),
        record.pid,
        record.tid,
        record.peer,
    )
}
