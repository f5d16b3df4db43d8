//! Plain or gzipped text files, chosen by the `.gz` extension.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

fn is_gz(file: &str) -> bool {
    Path::new(file).extension().and_then(|x| x.to_str()) == Some("gz")
}

/// Buffered reader over `input_file`, decompressing `*.gz`
pub fn open_buf_reader(input_file: &str) -> anyhow::Result<Box<dyn BufRead>> {
    let file = File::open(input_file)
        .map_err(|e| anyhow::anyhow!("cannot open {}: {}", input_file, e))?;
    if is_gz(input_file) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Buffered writer to `output_file`, compressing `*.gz`.
/// The name `stdout` writes to the standard output.
pub fn open_buf_writer(output_file: &str) -> anyhow::Result<Box<dyn Write>> {
    if output_file.eq_ignore_ascii_case("stdout") {
        return Ok(Box::new(BufWriter::new(std::io::stdout())));
    }
    let file = File::create(output_file)
        .map_err(|e| anyhow::anyhow!("cannot create {}: {}", output_file, e))?;
    if is_gz(output_file) {
        Ok(Box::new(BufWriter::new(GzEncoder::new(
            file,
            Compression::default(),
        ))))
    } else {
        Ok(Box::new(BufWriter::new(file)))
    }
}

/// All lines of `input_file`
pub fn read_lines(input_file: &str) -> anyhow::Result<Vec<Box<str>>> {
    open_buf_reader(input_file)?
        .lines()
        .map(|line| -> anyhow::Result<Box<str>> { Ok(line?.into_boxed_str()) })
        .collect()
}

/// Write one item per line. A closed pipe ends the output quietly.
///
/// * `lines` - anything printable
/// * `output_file` - destination, gzipped if it ends with `.gz`
pub fn write_lines<T: std::fmt::Display>(lines: &[T], output_file: &str) -> anyhow::Result<()> {
    let mut buf = open_buf_writer(output_file)?;
    for line in lines {
        match writeln!(buf, "{}", line) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::BrokenPipe => return Ok(()),
            Err(e) => return Err(e.into()),
        }
    }
    buf.flush()?;
    Ok(())
}

/// Create the parent directory of `file` if missing
pub fn mkdir(file: &str) -> anyhow::Result<()> {
    match Path::new(file).parent() {
        Some(dir) => Ok(std::fs::create_dir_all(dir)?),
        None => Ok(()),
    }
}
