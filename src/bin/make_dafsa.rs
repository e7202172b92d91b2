//! `make-dafsa`: compiles a gperf word list into a DAFSA.
//!
//! ```text
//! make-dafsa effective_tld_names.gperf etld_data.inc
//! make-dafsa --bin effective_tld_names.gperf etld_data.bin
//! ```

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use libdafsa::Error;
use libdafsa::dafsa::emit::{to_cxx, words_to_bin};
use libdafsa::dafsa::gperf::read_gperf_file;
use libdafsa::dafsa::{Encoder, EncoderConfig, ParseOptions};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

/// Compiles a gperf-style word list into a DAFSA byte array.
///
/// Every line between the two `%%` markers of INFILE must read
/// `word, <digit>`. The output is a C++ source fragment declaring
/// `kDafsa`, or the raw bytes with `--bin`.
#[derive(Parser, Debug)]
#[command(name = "make-dafsa")]
#[command(version)]
#[command(about = "Compile a word list into a DAFSA byte array", long_about = None)]
struct Cli {
    /// Dictionary in gperf format.
    infile: PathBuf,

    /// Where to write the result. Left untouched if compilation fails.
    outfile: PathBuf,

    /// Write the raw bytes instead of C++ source.
    #[arg(long)]
    bin: bool,

    /// How many times a link run may be re-sized before giving up.
    #[arg(long, default_value_t = EncoderConfig::default().max_sizing_rounds)]
    max_sizing_rounds: usize,

    /// Log progress (sets log level to DEBUG).
    #[arg(short, long)]
    verbose: bool,

    /// Log every resizing round (sets log level to TRACE).
    #[arg(long)]
    debug: bool,
}

fn run(cli: &Cli) -> Result<(), Error> {
    let dict = read_gperf_file(&cli.infile, &ParseOptions::default())?;
    let encoder = Encoder::new(EncoderConfig {
        max_sizing_rounds: cli.max_sizing_rounds,
    });
    let bytes = words_to_bin(dict.entries, &encoder)?;

    if cli.bin {
        fs::write(&cli.outfile, &bytes)?;
    } else {
        fs::write(&cli.outfile, to_cxx(&bytes, Some(dict.preamble.as_str())))?;
    }
    info!(bytes = bytes.len(), outfile = %cli.outfile.display(), "wrote dafsa");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        Level::TRACE
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("make-dafsa: {e}");
            if let Error::Io(source) = &e {
                eprintln!("  caused by: {source}");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::CommandFactory;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("make-dafsa-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    fn cli(infile: PathBuf, outfile: PathBuf, bin: bool) -> Cli {
        Cli {
            infile,
            outfile,
            bin,
            max_sizing_rounds: EncoderConfig::default().max_sizing_rounds,
            verbose: false,
            debug: false,
        }
    }

    #[test]
    fn arguments_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::try_parse_from(["make-dafsa", "--bin", "-v", "in.gperf", "out.bin"]).unwrap();
        assert!(cli.bin && cli.verbose && !cli.debug);
        assert_eq!(cli.infile, PathBuf::from("in.gperf"));
        assert_eq!(cli.max_sizing_rounds, 8);
        assert!(Cli::try_parse_from(["make-dafsa", "in.gperf"]).is_err());
    }

    #[test]
    fn writes_cxx_and_bin() {
        let infile = scratch("words.gperf");
        fs::write(&infile, "%{\n// preamble\n%}\n%%\naa, 1\na, 2\n%%\n").unwrap();

        let cxx = scratch("words.inc");
        run(&cli(infile.clone(), cxx.clone(), false)).unwrap();
        let text = fs::read_to_string(&cxx).unwrap();
        assert!(text.contains("%{\n// preamble\n%}\n\n"));
        assert!(text.contains("0x81, 0xe1, 0x02, 0x81, 0x82, 0x61, 0x81,"));

        let bin = scratch("words.bin");
        run(&cli(infile, bin.clone(), true)).unwrap();
        assert_eq!(
            fs::read(&bin).unwrap(),
            [0x81, 0xE1, 0x02, 0x81, 0x82, 0x61, 0x81]
        );
    }

    #[test]
    fn failure_leaves_outfile_alone() {
        let infile = scratch("bad.gperf");
        fs::write(&infile, "%%\naa, 3\n%%\n").unwrap();
        let outfile = scratch("bad.inc");
        fs::write(&outfile, "previous").unwrap();

        let err = run(&cli(infile, outfile.clone(), false)).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
        assert_eq!(fs::read_to_string(&outfile).unwrap(), "previous");
    }
}
