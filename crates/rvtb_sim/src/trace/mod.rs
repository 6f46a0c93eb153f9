//! Trace sinks: where per-tick signal snapshots go.
//!
//! The [`TraceSink`] trait abstracts trace output. [`VcdTrace`] writes IEEE
//! 1364 Value Change Dump text (optionally gzip-compressed when opened via
//! [`open_trace`]); [`NullTrace`] is used when tracing is disabled and only
//! enforces record ordering. [`check_trace`] reads a VCD back and verifies
//! that its records form a gapless tick sequence.

mod check;
mod vcd;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use rvtb_common::{SignalValue, Tick, Timescale};
use rvtb_config::TraceSection;
use tracing::debug;

use crate::error::HarnessError;
use crate::uut::SignalDecl;

pub use check::{check_trace, check_trace_file, TraceCheckError, TraceSummary};
pub use vcd::VcdTrace;

/// Recorder of per-tick signal snapshots.
///
/// Callers declare the signal set once, then record exactly one snapshot per
/// tick starting at tick 0 with no gaps, then close. Closing is idempotent;
/// recording after close fails with [`HarnessError::TraceClosed`].
pub trait TraceSink {
    /// Registers the model's signals under the top scope `top`.
    fn declare(&mut self, top: &str, signals: &[SignalDecl]) -> Result<(), HarnessError>;

    /// Records the values of all declared signals at `tick`.
    fn record(&mut self, tick: Tick, values: &[SignalValue]) -> Result<(), HarnessError>;

    /// Flushes and releases the output.
    fn close(&mut self) -> Result<(), HarnessError>;
}

impl<T: TraceSink + ?Sized> TraceSink for Box<T> {
    fn declare(&mut self, top: &str, signals: &[SignalDecl]) -> Result<(), HarnessError> {
        (**self).declare(top, signals)
    }

    fn record(&mut self, tick: Tick, values: &[SignalValue]) -> Result<(), HarnessError> {
        (**self).record(tick, values)
    }

    fn close(&mut self) -> Result<(), HarnessError> {
        (**self).close()
    }
}

/// Tracks the next tick a sink will accept.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct TickCursor {
    next: Tick,
    closed: bool,
}

impl TickCursor {
    /// Accepts `tick` if it is exactly the next expected tick.
    pub(crate) fn advance(&mut self, tick: Tick) -> Result<(), HarnessError> {
        if self.closed {
            return Err(HarnessError::TraceClosed);
        }
        if tick != self.next {
            return Err(HarnessError::TraceOrder {
                expected: self.next,
                got: tick,
            });
        }
        self.next = tick.next();
        Ok(())
    }

    /// Number of ticks accepted so far.
    pub(crate) fn recorded(&self) -> u64 {
        self.next.as_u64()
    }

    pub(crate) fn close(&mut self) -> bool {
        std::mem::replace(&mut self.closed, true)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }
}

/// A sink that discards snapshots but still enforces tick ordering.
#[derive(Debug, Default)]
pub struct NullTrace {
    cursor: TickCursor,
}

impl NullTrace {
    /// Creates a discarding sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records accepted.
    pub fn records(&self) -> u64 {
        self.cursor.recorded()
    }
}

impl TraceSink for NullTrace {
    fn declare(&mut self, _top: &str, _signals: &[SignalDecl]) -> Result<(), HarnessError> {
        Ok(())
    }

    fn record(&mut self, tick: Tick, _values: &[SignalValue]) -> Result<(), HarnessError> {
        self.cursor.advance(tick)
    }

    fn close(&mut self) -> Result<(), HarnessError> {
        self.cursor.close();
        Ok(())
    }
}

/// A byte sink that needs an explicit end-of-stream step.
///
/// Plain writers only flush; compressed writers also emit their trailer.
pub trait TraceWrite: Write {
    /// Completes the stream. Called once when the sink is closed.
    fn finish(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl TraceWrite for Vec<u8> {}

impl<W: Write> TraceWrite for BufWriter<W> {}

impl<W: TraceWrite + ?Sized> TraceWrite for &mut W {
    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}

/// The file behind a trace opened with [`open_trace`].
pub enum TraceFile {
    /// Uncompressed VCD text.
    Plain(BufWriter<File>),
    /// Gzip-compressed VCD text.
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Write for TraceFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            TraceFile::Plain(w) => w.write(buf),
            TraceFile::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            TraceFile::Plain(w) => w.flush(),
            TraceFile::Gzip(w) => w.flush(),
        }
    }
}

impl TraceWrite for TraceFile {
    fn finish(&mut self) -> io::Result<()> {
        match self {
            TraceFile::Plain(w) => w.flush(),
            TraceFile::Gzip(w) => {
                w.try_finish()?;
                w.get_mut().flush()
            }
        }
    }
}

/// Settings for a file-backed trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceOptions {
    /// Output path; a `.gz` extension selects gzip compression.
    pub path: PathBuf,
    /// Hierarchy levels to record; 0 records everything.
    pub depth: u32,
    /// Tick duration written into the header.
    pub timescale: Timescale,
}

impl TraceOptions {
    /// Creates options for `path` with unlimited depth and the default timescale.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            depth: 0,
            timescale: Timescale::default(),
        }
    }

    /// Builds options from the `[trace]` section; `None` when tracing is disabled.
    pub fn from_config(section: &TraceSection) -> Option<Self> {
        section.enabled.then(|| Self {
            path: section.path.clone(),
            depth: section.depth,
            timescale: section.timescale,
        })
    }

    /// True when the path selects gzip output.
    pub fn is_compressed(&self) -> bool {
        is_gzip_path(&self.path)
    }
}

pub(crate) fn is_gzip_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Creates the trace file and wraps it in a [`VcdTrace`].
///
/// The file is created (or truncated) immediately; failure is reported as
/// [`HarnessError::TraceOpen`] and leaves nothing behind.
pub fn open_trace(options: &TraceOptions) -> Result<VcdTrace<TraceFile>, HarnessError> {
    let file = File::create(&options.path).map_err(|source| HarnessError::TraceOpen {
        path: options.path.clone(),
        source,
    })?;
    let writer = BufWriter::new(file);
    let out = if options.is_compressed() {
        TraceFile::Gzip(GzEncoder::new(writer, Compression::default()))
    } else {
        TraceFile::Plain(writer)
    };
    debug!(
        path = %options.path.display(),
        compressed = options.is_compressed(),
        "trace opened"
    );
    Ok(VcdTrace::new(out)
        .with_depth(options.depth)
        .with_timescale(options.timescale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn cursor_accepts_consecutive_ticks() {
        let mut c = TickCursor::default();
        c.advance(Tick::new(0)).unwrap();
        c.advance(Tick::new(1)).unwrap();
        assert_eq!(c.recorded(), 2);
    }

    #[test]
    fn cursor_rejects_gap_and_duplicate() {
        let mut c = TickCursor::default();
        c.advance(Tick::new(0)).unwrap();
        assert!(matches!(
            c.advance(Tick::new(2)),
            Err(HarnessError::TraceOrder { .. })
        ));
        assert!(matches!(
            c.advance(Tick::new(0)),
            Err(HarnessError::TraceOrder { .. })
        ));
    }

    #[test]
    fn cursor_must_start_at_zero() {
        let mut c = TickCursor::default();
        let err = c.advance(Tick::new(1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "trace record out of order: expected tick 0, got 1"
        );
    }

    #[test]
    fn null_trace_counts_and_closes() {
        let mut t = NullTrace::new();
        t.declare("top", &[]).unwrap();
        t.record(Tick::ZERO, &[]).unwrap();
        t.record(Tick::new(1), &[]).unwrap();
        assert_eq!(t.records(), 2);
        t.close().unwrap();
        t.close().unwrap();
        assert!(matches!(
            t.record(Tick::new(2), &[]),
            Err(HarnessError::TraceClosed)
        ));
    }

    #[test]
    fn options_from_disabled_config() {
        let section = TraceSection {
            enabled: false,
            ..TraceSection::default()
        };
        assert!(TraceOptions::from_config(&section).is_none());
    }

    #[test]
    fn options_from_default_config() {
        let opts = TraceOptions::from_config(&TraceSection::default()).unwrap();
        assert_eq!(opts.path, PathBuf::from("rv32im_top_tb.vcd"));
        assert_eq!(opts.depth, 99);
        assert!(!opts.is_compressed());
    }

    #[test]
    fn gzip_selected_by_extension() {
        assert!(TraceOptions::new("a.vcd.gz").is_compressed());
        assert!(!TraceOptions::new("a.vcd").is_compressed());
        assert!(!TraceOptions::new("gz").is_compressed());
    }

    #[test]
    fn open_trace_fails_for_missing_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("t.vcd");
        let err = open_trace(&TraceOptions::new(&path)).unwrap_err();
        assert!(matches!(err, HarnessError::TraceOpen { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn open_trace_writes_plain_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("t.vcd");
        let mut sink = open_trace(&TraceOptions::new(&path)).unwrap();
        sink.declare("top", &[SignalDecl::new("clk", 1)]).unwrap();
        sink.record(Tick::ZERO, &[SignalValue::from_bool(true)])
            .unwrap();
        sink.close().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("$enddefinitions $end"));
        assert!(text.contains("#0"));
    }

    #[test]
    fn open_trace_writes_gzip_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("t.vcd.gz");
        let mut sink = open_trace(&TraceOptions::new(&path)).unwrap();
        sink.declare("top", &[SignalDecl::new("clk", 1)]).unwrap();
        sink.record(Tick::ZERO, &[SignalValue::from_bool(false)])
            .unwrap();
        sink.close().unwrap();

        let mut text = String::new();
        flate2::read::GzDecoder::new(File::open(&path).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        assert!(text.contains("$var wire 1 ! clk $end"));
        assert!(text.contains("0!"));
    }
}
