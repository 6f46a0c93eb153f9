//! IEEE 1364 Value Change Dump output.
//!
//! The first record (tick 0) dumps every traced signal inside `$dumpvars`;
//! every later record writes a `#tick` line followed by only the signals
//! whose value changed. A timestamp is written for every tick so each tick
//! has exactly one record even if nothing but the clock moved.

use std::fmt;

use rvtb_common::{SignalValue, Tick, Timescale};
use tracing::debug;

use super::{TickCursor, TraceSink, TraceWrite};
use crate::error::HarnessError;
use crate::uut::SignalDecl;

/// A traced variable: its position in the sample vector and its VCD code.
#[derive(Debug)]
struct VcdVar {
    index: usize,
    code: String,
}

/// VCD writer over any [`TraceWrite`] output.
pub struct VcdTrace<W: TraceWrite> {
    writer: W,
    depth: u32,
    timescale: Timescale,
    /// Number of signals the model declared (traced or not).
    declared: Option<usize>,
    header_written: bool,
    vars: Vec<VcdVar>,
    /// Last written value per traced variable; empty until the first record.
    last: Vec<SignalValue>,
    cursor: TickCursor,
}

impl<W: TraceWrite> VcdTrace<W> {
    /// Creates a writer with unlimited depth and the default timescale.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            depth: 0,
            timescale: Timescale::default(),
            declared: None,
            header_written: false,
            vars: Vec::new(),
            last: Vec::new(),
            cursor: TickCursor::default(),
        }
    }

    /// Limits tracing to signals at most `depth` levels deep (0 = unlimited).
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Sets the timescale written into the header.
    pub fn with_timescale(mut self, timescale: Timescale) -> Self {
        self.timescale = timescale;
        self
    }

    /// Number of records written so far.
    pub fn records(&self) -> u64 {
        self.cursor.recorded()
    }

    /// Borrows the underlying output.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consumes the writer and returns the underlying output.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Generates a VCD identifier code from a sequential index.
    ///
    /// Uses printable ASCII characters starting from `!` (0x21).
    /// Multi-character codes are generated for indices >= 94.
    fn make_id_code(index: usize) -> String {
        let mut result = String::new();
        let mut idx = index;
        loop {
            result.push((b'!' + (idx % 94) as u8) as char);
            idx /= 94;
            if idx == 0 {
                break;
            }
            idx -= 1;
        }
        result
    }

    fn is_traced(&self, decl: &SignalDecl) -> bool {
        self.depth == 0 || decl.level() <= self.depth
    }

    fn write_header(&mut self) -> Result<(), HarnessError> {
        self.header_written = true;
        writeln!(self.writer, "$version")?;
        writeln!(self.writer, "  rvtb {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$timescale")?;
        writeln!(self.writer, "  {}", self.timescale)?;
        writeln!(self.writer, "$end")?;
        Ok(())
    }

    fn write_value(&mut self, var: usize, value: &SignalValue) -> Result<(), HarnessError> {
        let code = &self.vars[var].code;
        if value.width() == 1 {
            writeln!(self.writer, "{}{code}", value.vcd_string())?;
        } else {
            writeln!(self.writer, "{} {code}", value.vcd_string())?;
        }
        Ok(())
    }
}

impl<W: TraceWrite> fmt::Debug for VcdTrace<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VcdTrace")
            .field("depth", &self.depth)
            .field("timescale", &self.timescale)
            .field("declared", &self.declared)
            .field("traced", &self.vars.len())
            .field("records", &self.records())
            .finish()
    }
}

impl<W: TraceWrite> TraceSink for VcdTrace<W> {
    fn declare(&mut self, top: &str, signals: &[SignalDecl]) -> Result<(), HarnessError> {
        if self.declared.is_some() {
            return Err(HarnessError::TraceAlreadyDeclared);
        }
        if self.cursor.is_closed() {
            return Err(HarnessError::TraceClosed);
        }
        for decl in signals {
            SignalValue::new_unknown(decl.width).map_err(|source| HarnessError::InvalidSignal {
                name: decl.name.clone(),
                source,
            })?;
        }

        // Group signals by scope so each scope is opened once.
        let mut order: Vec<usize> = (0..signals.len())
            .filter(|&i| self.is_traced(&signals[i]))
            .collect();
        order.sort_by(|&a, &b| signals[a].scope.cmp(&signals[b].scope));

        self.write_header()?;
        writeln!(self.writer, "$scope module {top} $end")?;
        let mut open: &[String] = &[];
        for (n, &index) in order.iter().enumerate() {
            let decl = &signals[index];
            let common = open
                .iter()
                .zip(&decl.scope)
                .take_while(|(a, b)| a == b)
                .count();
            for _ in common..open.len() {
                writeln!(self.writer, "$upscope $end")?;
            }
            for name in &decl.scope[common..] {
                writeln!(self.writer, "$scope module {name} $end")?;
            }
            open = &decl.scope;

            let code = Self::make_id_code(n);
            if decl.width == 1 {
                writeln!(self.writer, "$var wire 1 {code} {} $end", decl.name)?;
            } else {
                writeln!(
                    self.writer,
                    "$var wire {} {code} {} [{}:0] $end",
                    decl.width,
                    decl.name,
                    decl.width - 1
                )?;
            }
            self.vars.push(VcdVar { index, code });
        }
        for _ in 0..open.len() {
            writeln!(self.writer, "$upscope $end")?;
        }
        writeln!(self.writer, "$upscope $end")?;
        writeln!(self.writer, "$enddefinitions $end")?;

        self.declared = Some(signals.len());
        debug!(top, declared = signals.len(), traced = self.vars.len(), "trace declared");
        Ok(())
    }

    fn record(&mut self, tick: Tick, values: &[SignalValue]) -> Result<(), HarnessError> {
        let declared = self.declared.ok_or(HarnessError::TraceNotDeclared)?;
        if values.len() != declared {
            return Err(HarnessError::SampleMismatch {
                declared,
                sampled: values.len(),
            });
        }
        self.cursor.advance(tick)?;

        writeln!(self.writer, "#{tick}")?;
        if self.last.is_empty() && !self.vars.is_empty() {
            writeln!(self.writer, "$dumpvars")?;
            for var in 0..self.vars.len() {
                let value = values[self.vars[var].index];
                self.write_value(var, &value)?;
                self.last.push(value);
            }
            writeln!(self.writer, "$end")?;
        } else {
            for var in 0..self.vars.len() {
                let value = values[self.vars[var].index];
                if value != self.last[var] {
                    self.write_value(var, &value)?;
                    self.last[var] = value;
                }
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), HarnessError> {
        if self.cursor.close() {
            return Ok(());
        }
        if !self.header_written {
            self.write_header()?;
        }
        if self.declared.is_none() {
            writeln!(self.writer, "$enddefinitions $end")?;
        }
        self.writer.finish()?;
        debug!(records = self.cursor.recorded(), "trace closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_trace() -> VcdTrace<Vec<u8>> {
        VcdTrace::new(Vec::new())
    }

    fn output(trace: VcdTrace<Vec<u8>>) -> String {
        String::from_utf8(trace.into_inner()).unwrap()
    }

    fn bit(level: bool) -> SignalValue {
        SignalValue::from_bool(level)
    }

    #[test]
    fn id_code_first() {
        assert_eq!(VcdTrace::<Vec<u8>>::make_id_code(0), "!");
    }

    #[test]
    fn id_code_sequential() {
        assert_eq!(VcdTrace::<Vec<u8>>::make_id_code(1), "\"");
        assert_eq!(VcdTrace::<Vec<u8>>::make_id_code(93), "~");
    }

    #[test]
    fn id_code_multi_char() {
        assert_eq!(VcdTrace::<Vec<u8>>::make_id_code(94), "!!");
        assert_eq!(VcdTrace::<Vec<u8>>::make_id_code(95), "\"!");
    }

    #[test]
    fn header_contents() {
        let mut t = make_trace()
            .with_timescale("10ns".parse().unwrap());
        t.declare("top", &[SignalDecl::new("clk", 1)]).unwrap();
        t.close().unwrap();
        let out = output(t);
        assert!(out.starts_with("$version\n  rvtb "));
        assert!(out.contains("$timescale\n  10ns\n$end"));
        assert!(out.contains("$scope module top $end"));
        assert!(out.contains("$var wire 1 ! clk $end"));
        assert!(out.contains("$enddefinitions $end"));
        assert!(!out.contains("$date"));
    }

    #[test]
    fn vector_var_has_range() {
        let mut t = make_trace();
        t.declare("top", &[SignalDecl::new("cycle", 32)]).unwrap();
        assert!(output(t).contains("$var wire 32 ! cycle [31:0] $end"));
    }

    #[test]
    fn nested_scopes_open_once() {
        let signals = [
            SignalDecl::scoped(["core"], "pc", 32),
            SignalDecl::new("clk", 1),
            SignalDecl::scoped(["core", "alu"], "y", 8),
            SignalDecl::scoped(["core"], "ir", 32),
        ];
        let mut t = make_trace();
        t.declare("rv32im_top", &signals).unwrap();
        let out = output(t);
        let defs: Vec<&str> = out
            .lines()
            .skip_while(|l| !l.starts_with("$scope"))
            .take_while(|l| !l.starts_with("$enddefinitions"))
            .collect();
        assert_eq!(
            defs,
            vec![
                "$scope module rv32im_top $end",
                "$var wire 1 ! clk $end",
                "$scope module core $end",
                "$var wire 32 \" pc [31:0] $end",
                "$var wire 32 # ir [31:0] $end",
                "$scope module alu $end",
                "$var wire 8 $ y [7:0] $end",
                "$upscope $end",
                "$upscope $end",
                "$upscope $end",
            ]
        );
    }

    #[test]
    fn depth_limits_traced_signals() {
        let signals = [
            SignalDecl::new("clk", 1),
            SignalDecl::scoped(["core"], "pc", 32),
        ];
        let mut t = make_trace().with_depth(1);
        t.declare("top", &signals).unwrap();
        // Values are still sampled for every declared signal.
        t.record(
            Tick::ZERO,
            &[bit(true), SignalValue::from_u64(0, 32).unwrap()],
        )
        .unwrap();
        let out = output(t);
        assert!(out.contains("clk"));
        assert!(!out.contains("pc"));
        assert!(!out.contains("module core"));
    }

    #[test]
    fn first_record_dumps_everything() {
        let mut t = make_trace();
        t.declare(
            "top",
            &[SignalDecl::new("clk", 1), SignalDecl::new("data", 4)],
        )
        .unwrap();
        t.record(
            Tick::ZERO,
            &[bit(true), SignalValue::new_unknown(4).unwrap()],
        )
        .unwrap();
        let out = output(t);
        assert!(out.contains("#0\n$dumpvars\n1!\nbxxxx \"\n$end\n"));
    }

    #[test]
    fn later_records_write_only_changes() {
        let mut t = make_trace();
        t.declare(
            "top",
            &[SignalDecl::new("clk", 1), SignalDecl::new("data", 4)],
        )
        .unwrap();
        let d = SignalValue::from_u64(0b1010, 4).unwrap();
        t.record(Tick::new(0), &[bit(true), d]).unwrap();
        t.record(Tick::new(1), &[bit(false), d]).unwrap();
        t.record(Tick::new(2), &[bit(false), d]).unwrap();
        t.close().unwrap();
        let out = output(t);
        let body = out.split("$enddefinitions $end\n").nth(1).unwrap();
        assert_eq!(
            body,
            "#0\n$dumpvars\n1!\nb1010 \"\n$end\n#1\n0!\n#2\n"
        );
    }

    #[test]
    fn out_of_order_record_fails() {
        let mut t = make_trace();
        t.declare("top", &[]).unwrap();
        t.record(Tick::ZERO, &[]).unwrap();
        let err = t.record(Tick::new(5), &[]).unwrap_err();
        assert!(matches!(err, HarnessError::TraceOrder { .. }));
    }

    #[test]
    fn sample_count_must_match_declaration() {
        let mut t = make_trace();
        t.declare("top", &[SignalDecl::new("clk", 1)]).unwrap();
        let err = t.record(Tick::ZERO, &[]).unwrap_err();
        assert!(matches!(
            err,
            HarnessError::SampleMismatch {
                declared: 1,
                sampled: 0
            }
        ));
        // The rejected record did not consume tick 0.
        t.record(Tick::ZERO, &[bit(false)]).unwrap();
    }

    #[test]
    fn record_before_declare_fails() {
        let mut t = make_trace();
        assert!(matches!(
            t.record(Tick::ZERO, &[]),
            Err(HarnessError::TraceNotDeclared)
        ));
    }

    #[test]
    fn declare_twice_fails() {
        let mut t = make_trace();
        t.declare("top", &[]).unwrap();
        assert!(matches!(
            t.declare("top", &[]),
            Err(HarnessError::TraceAlreadyDeclared)
        ));
    }

    #[test]
    fn invalid_width_rejected() {
        let mut t = make_trace();
        let err = t.declare("top", &[SignalDecl::new("wide", 65)]).unwrap_err();
        assert!(err.to_string().contains("wide"));
    }

    #[test]
    fn close_without_declare_still_writes_header() {
        let mut t = make_trace();
        t.close().unwrap();
        let out = output(t);
        assert!(out.contains("$timescale"));
        assert!(out.contains("$enddefinitions $end"));
    }

    /// Output that rejects any write containing a `$var` declaration.
    struct FailOnVar(Vec<u8>);

    impl std::io::Write for FailOnVar {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if buf.windows(4).any(|w| w == b"$var") {
                return Err(std::io::Error::other("disk full"));
            }
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl TraceWrite for FailOnVar {}

    #[test]
    fn failed_declare_then_close_writes_one_header() {
        let mut t = VcdTrace::new(FailOnVar(Vec::new()));
        let err = t.declare("top", &[SignalDecl::new("clk", 1)]).unwrap_err();
        assert!(matches!(err, HarnessError::TraceIo(_)));
        t.close().unwrap();

        let out = String::from_utf8(t.into_inner().0).unwrap();
        assert_eq!(out.matches("$version").count(), 1);
        assert_eq!(out.matches("$timescale").count(), 1);
        assert!(out.ends_with("$enddefinitions $end\n"));
    }

    #[test]
    fn debug_shows_progress_not_output() {
        let mut t = make_trace().with_depth(2);
        t.declare("top", &[SignalDecl::new("clk", 1)]).unwrap();
        t.record(Tick::ZERO, &[bit(true)]).unwrap();
        let s = format!("{t:?}");
        assert!(s.starts_with("VcdTrace"), "{s}");
        assert!(s.contains("depth: 2"), "{s}");
        assert!(s.contains("records: 1"), "{s}");
    }

    #[test]
    fn close_is_idempotent_and_final() {
        let mut t = make_trace();
        t.declare("top", &[]).unwrap();
        t.close().unwrap();
        let len = t.get_ref().len();
        t.close().unwrap();
        assert_eq!(t.get_ref().len(), len);
        assert!(matches!(
            t.record(Tick::ZERO, &[]),
            Err(HarnessError::TraceClosed)
        ));
    }
}
