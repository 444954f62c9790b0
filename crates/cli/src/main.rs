//! Data value prediction driver.
//!
//! This binary plays the role the host simulator plays in the engine's own
//! specification: it reads a line-oriented instruction trace, classifies
//! each line's opcode, and drives `Lookup`/`Update` on a single [`Predictor`]
//! instance exactly once per line, printing the trace lines and final stats
//! dump the engine itself produces. It does not decode real instructions —
//! that responsibility belongs to the simulator this engine is embedded in
//! (out of scope, see the `dvp-core` crate documentation).
//!
//! Trace file format: one instruction per line, `<pc_hex> <op> <value>`,
//! e.g. `0x100 load 7`. Blank lines and lines starting with `#` are ignored.

use std::fmt;
use std::fs;
use std::process;
use std::str::FromStr;

use clap::{Parser, ValueEnum};

use dvp_core::config::{DvpConfig, HybridConfig, LastConfig, PredictorClass, StrideConfig, TwoLevelConfig};
use dvp_core::{Op, Predictor};

/// Data value prediction engine driver: feeds a trace through one of the
/// four predictor classes and reports its accuracy.
#[derive(Parser, Debug)]
#[command(name = "dvp", author, version, about = "Data value prediction engine driver")]
struct Cli {
    /// Predictor class to instantiate.
    #[arg(long = "class", value_enum, default_value_t = ClassArg::Last)]
    class: ClassArg,

    /// Last-value predictor sizing: `ct_size,counter_size,vpt_size,hist`.
    #[arg(long = "last", value_name = "N,C,M,H")]
    last: Option<LastArgs>,

    /// Stride predictor sizing: `vht_size`.
    #[arg(long = "stride", value_name = "N")]
    stride: Option<StrideArgs>,

    /// Two-level predictor sizing: `vht_size,threshold,pht_size,hist,xor`.
    #[arg(long = "2lev", value_name = "N,T,P,H,X")]
    two_level: Option<TwoLevelArgs>,

    /// Hybrid predictor sizing: `vht_size,threshold,pht_size,hist,xor`.
    #[arg(long = "hybrid", value_name = "N,T,P,H,X")]
    hybrid: Option<TwoLevelArgs>,

    /// Emit the per-instruction textual trace (`§6` of the engine spec).
    #[arg(long = "trace", value_name = "0|1", default_value_t = 0)]
    trace: u8,

    /// Line-oriented instruction trace file: `<pc_hex> <op> <value>` per line.
    trace_file: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ClassArg {
    Last,
    Stride,
    #[value(name = "2lev")]
    TwoLev,
    Hybrid,
}

impl From<ClassArg> for PredictorClass {
    fn from(class: ClassArg) -> Self {
        match class {
            ClassArg::Last => Self::Last,
            ClassArg::Stride => Self::Stride,
            ClassArg::TwoLev => Self::TwoLevel,
            ClassArg::Hybrid => Self::Hybrid,
        }
    }
}

/// Malformed `--last`/`--stride`/`--2lev`/`--hybrid` argument: wrong field
/// count or a field that isn't an integer.
#[derive(Debug)]
struct CliArgError {
    flag: &'static str,
    want_fields: usize,
}

impl fmt::Display for CliArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} argument expects {} comma-separated integers", self.flag, self.want_fields)
    }
}

impl std::error::Error for CliArgError {}

/// Splits `s` on commas into exactly `N` `u32`s, or fails with a
/// [`CliArgError`] naming `flag`.
fn parse_fields<const N: usize>(s: &str, flag: &'static str) -> Result<[u32; N], CliArgError> {
    let err = || CliArgError { flag, want_fields: N };
    let mut fields = [0u32; N];
    let mut parts = s.split(',');
    for field in &mut fields {
        *field = parts.next().ok_or_else(err)?.trim().parse::<u32>().map_err(|_| err())?;
    }
    if parts.next().is_some() {
        return Err(err());
    }
    Ok(fields)
}

#[derive(Clone, Copy, Debug)]
struct LastArgs(LastConfig);

impl FromStr for LastArgs {
    type Err = CliArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [ct_size, counter_size, vpt_size, hist] = parse_fields(s, "last")?;
        Ok(Self(LastConfig { ct_size, counter_size, vpt_size, hist }))
    }
}

#[derive(Clone, Copy, Debug)]
struct StrideArgs(StrideConfig);

impl FromStr for StrideArgs {
    type Err = CliArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [vht_size] = parse_fields(s, "stride")?;
        Ok(Self(StrideConfig { vht_size }))
    }
}

#[derive(Clone, Copy, Debug)]
struct TwoLevelArgs(TwoLevelConfig);

impl FromStr for TwoLevelArgs {
    type Err = CliArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [vht_size, threshold, pht_size, hist, xor] = parse_fields(s, "2lev/hybrid")?;
        Ok(Self(TwoLevelConfig { vht_size, threshold, pht_size, hist, xor }))
    }
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut config = DvpConfig { class: cli.class.into(), trace: cli.trace != 0, ..DvpConfig::default() };
    if let Some(LastArgs(last)) = cli.last {
        config.last = last;
    }
    if let Some(StrideArgs(stride)) = cli.stride {
        config.stride = stride;
    }
    if let Some(TwoLevelArgs(two_level)) = cli.two_level {
        config.two_level = two_level;
    }
    if let Some(TwoLevelArgs(hybrid)) = cli.hybrid {
        config.hybrid = HybridConfig {
            vht_size: hybrid.vht_size,
            threshold: hybrid.threshold,
            pht_size: hybrid.pht_size,
            hist: hybrid.hist,
            xor: hybrid.xor,
        };
    }

    let mut predictor = Predictor::new(config).unwrap_or_else(|err| {
        eprintln!("dvp: fatal: {err}");
        process::exit(1);
    });

    let contents = fs::read_to_string(&cli.trace_file).unwrap_or_else(|err| {
        eprintln!("dvp: cannot read trace file `{}': {err}", cli.trace_file);
        process::exit(1);
    });

    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((pc, op, op_name, value)) = parse_trace_line(line) else {
            eprintln!("dvp: malformed trace line {}: `{line}'", lineno + 1);
            process::exit(1);
        };

        let eligible = op.is_value_predictable();
        let outcome = predictor.lookup(pc, op);
        let (first, second) = predictor.trace_lines(pc, op_name, eligible, &outcome, value);
        if predictor.is_tracing() {
            println!("{first}");
            if let Some(second) = second {
                println!("{second}");
            }
        }
        predictor.update(pc, op, value, &outcome);
    }

    predictor.stats().print("dpred");
}

/// Parses one `<pc_hex> <op> <value>` trace line.
fn parse_trace_line(line: &str) -> Option<(u64, Op, &str, i64)> {
    let mut fields = line.split_whitespace();
    let pc_field = fields.next()?;
    let pc = u64::from_str_radix(pc_field.trim_start_matches("0x"), 16).ok()?;
    let op_name = fields.next()?;
    let op = parse_op(op_name)?;
    let value = fields.next()?.parse::<i64>().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some((pc, op, op_name, value))
}

/// Maps the driver's opcode names to the engine's pinned `Op` classification.
fn parse_op(name: &str) -> Option<Op> {
    match name {
        "alu" | "int_alu" | "add" | "sub" | "and" | "or" | "xor" | "slt" => Some(Op::IntAlu),
        "load" | "ld" => Some(Op::Load),
        "mul" | "div" | "fp" | "long_latency" => Some(Op::LongLatency),
        "store" | "sd" | "sw" => Some(Op::Store),
        "branch" | "jump" | "jal" | "jalr" => Some(Op::Branch),
        "system" | "ecall" | "csr" | "fence" => Some(Op::System),
        _ => None,
    }
}
