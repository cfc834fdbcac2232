use serde::Serialize;
use std::io::{self, Write};

use crate::config::OutputFormat;
use crate::error::{Result, ScrapingError};
use crate::extractor::ProxyRecord;

pub const SYSTEM_TAG: &str = "[system]";
pub const SERVER_TAG: &str = "[server]";

/// Turns records and status messages into output lines (without newline).
pub trait LineFormatter: Send {
    fn record_line(&self, record: &ProxyRecord) -> Result<String>;
    fn system_line(&self, message: &str) -> Result<String>;
}

/// `[server] [<site>] host:port` and `[system] ...`.
pub struct TextFormatter;

/// One JSON object per line, told apart by `kind`.
pub struct JsonlFormatter;

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum JsonLine<'a> {
    Record(&'a ProxyRecord),
    System { message: &'a str },
}

impl LineFormatter for TextFormatter {
    fn record_line(&self, record: &ProxyRecord) -> Result<String> {
        Ok(format!("{} [{}] {}:{}", SERVER_TAG, record.site, record.host, record.port))
    }

    fn system_line(&self, message: &str) -> Result<String> {
        Ok(format!("{} {}", SYSTEM_TAG, message))
    }
}

impl LineFormatter for JsonlFormatter {
    fn record_line(&self, record: &ProxyRecord) -> Result<String> {
        let line = serde_json::to_string(&JsonLine::Record(record))
            .map_err(|e| ScrapingError::OutputError(format!("JSON serialization failed: {}", e)))?;
        Ok(line)
    }

    fn system_line(&self, message: &str) -> Result<String> {
        let line = serde_json::to_string(&JsonLine::System { message })
            .map_err(|e| ScrapingError::OutputError(format!("JSON serialization failed: {}", e)))?;
        Ok(line)
    }
}

pub fn formatter_for(format: OutputFormat) -> Box<dyn LineFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Jsonl => Box::new(JsonlFormatter),
    }
}

/// Writes data and status lines to the output stream as soon as they are produced.
pub struct Reporter {
    out: Box<dyn Write + Send>,
    formatter: Box<dyn LineFormatter>,
    records_emitted: u64,
}

impl Reporter {
    pub fn new(out: Box<dyn Write + Send>, format: OutputFormat) -> Self {
        Self {
            out,
            formatter: formatter_for(format),
            records_emitted: 0,
        }
    }

    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(Box::new(io::stdout()), format)
    }

    pub fn record(&mut self, record: &ProxyRecord) -> Result<()> {
        let line = self.formatter.record_line(record)?;
        self.write_line(&line)?;
        self.records_emitted += 1;
        Ok(())
    }

    pub fn system(&mut self, message: impl AsRef<str>) -> Result<()> {
        let line = self.formatter.system_line(message.as_ref())?;
        self.write_line(&line)
    }

    pub fn records_emitted(&self) -> u64 {
        self.records_emitted
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{}", line).map_err(ScrapingError::from)?;
        self.out.flush().map_err(ScrapingError::from)?;
        Ok(())
    }
}

/// In-memory sink whose contents stay readable after being boxed into a [`Reporter`].
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

#[cfg(test)]
impl SharedBuffer {
    pub(crate) fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes).lines().map(str::to_string).collect()
    }
}

#[cfg(test)]
impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
