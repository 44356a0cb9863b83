//! `ginflate` — decompress a gzip file to a second file, or stdout if none
//! is given, one chunk at a time.
//!
//! A thin file-I/O driver around [`streaming_inflate::Inflater`], grounded
//! on the refill/flush loop in `original_source/src/inflate.c`
//! (`file_read_data`/`file_write_data`) translated into `std::io`: read a
//! fixed-size chunk, feed it to the inflater, write whatever it produced,
//! and repeat — the same shape a real streaming consumer (a socket, a pipe)
//! would use, just sourced from a file here.

use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::process::ExitCode;

use streaming_inflate::{InflateStatus, Inflater};

const CHUNK_SIZE: usize = 64 * 1024;

fn main() -> ExitCode {
    let mut args = env::args_os().skip(1);
    let Some(input_path) = args.next() else {
        eprintln!("usage: ginflate <input.gz> [output]");
        return ExitCode::FAILURE;
    };
    let output_path = args.next();

    match run(input_path.as_ref(), output_path.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ginflate: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(input_path: &std::path::Path, output_path: Option<&std::path::Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut input_file = File::open(input_path)?;
    let mut out: Box<dyn Write> = match output_path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let mut inflater = Inflater::new();
    let mut in_buf = [0u8; CHUNK_SIZE];
    let mut out_buf = [0u8; CHUNK_SIZE];

    // `in_buf[in_pos..in_len]` is the unconsumed remainder from the last
    // read: `inflate` is free to take only part of what's offered, so
    // whatever it leaves behind has to survive into the next iteration
    // rather than being dropped on the floor.
    let mut in_pos = 0;
    let mut in_len = 0;

    loop {
        if in_pos == in_len {
            in_len = input_file.read(&mut in_buf)?;
            in_pos = 0;
        }

        let outcome = inflater.inflate(&in_buf[in_pos..in_len], &mut out_buf)?;
        in_pos += outcome.bytes_read;
        if outcome.bytes_written > 0 {
            out.write_all(&out_buf[..outcome.bytes_written])?;
        }

        match outcome.status {
            InflateStatus::Done => break,
            InflateStatus::NeedsMoreOutput => continue,
            InflateStatus::NeedsMoreInput => {
                if in_pos == in_len && in_len == 0 {
                    return Err("truncated gzip stream".into());
                }
                continue;
            }
        }
    }

    out.flush()?;
    Ok(())
}
