use std::{
    io::{self, Write},
    path::Path,
};

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Installs the process-wide logger: debug for this crate, warn for the
/// HTTP stack, written both to stdout and to `log_file` (truncated).
/// `RUST_LOG` takes precedence over these defaults.
pub fn init(log_file: &Path) -> anyhow::Result<()> {
    let file = fs_err::File::create(log_file)?;
    Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_CRATE_NAME"), LevelFilter::Debug)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(Tee(io::stdout(), file))))
        .try_init()?;
    Ok(())
}

/// Writes everything to both of its sinks.
pub struct Tee<A, B>(pub A, pub B);

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write_all(buf)?;
        self.1.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()?;
        self.1.flush()
    }
}
