use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crate::domain::MetricPoint;
use crate::ports::MetricSink;

/// Writes points in the Graphite plaintext format: `<name> <value> <unix_ts>`
pub struct GraphiteLineSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl GraphiteLineSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> GraphiteLineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn format_line(point: &MetricPoint) -> String {
        format!("{} {} {}\n", point.name, point.value, point.timestamp.timestamp())
    }
}

impl<W: Write + Send> MetricSink for GraphiteLineSink<W> {
    fn publish(&self, point: MetricPoint) {
        let line = Self::format_line(&point);
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writer.write_all(line.as_bytes()).and_then(|_| writer.flush()) {
            tracing::trace!(metric = %point.name, error = %e, "Dropped metric line");
        }
    }
}
