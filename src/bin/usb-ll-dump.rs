//! Ad-hoc inspector for captured USB 1.x line-symbol streams.
//!
//! Reads a text file containing either a raw symbol literal (`J`, `K`, `0`
//! for SE0, `1` for SE1) or, with `--bits`, a lsb-first bit literal that is
//! first NRZI-encoded, and attempts to decode it as a single packet. This
//! is a debugging convenience, not a test harness or scenario runner — both
//! of those are out of scope for this crate.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use structopt::StructOpt;
use usb_ll_codec::{BitVec, PacketCodec, Symbol, SymbolStream};

#[derive(StructOpt, Debug)]
#[structopt(
    about = "Decodes a captured USB 1.x line-symbol stream into a typed packet. Report bugs and request features at <https://github.com/embedded-rust/usb-ll-codec>."
)]
struct Opt {
    #[structopt(
        short,
        long,
        help = "Treat FILE's contents as a lsb-first bit literal (e.g. \"0000_0001_1100_0011...\") rather than a symbol literal, and NRZI-encode it before decoding"
    )]
    bits: bool,

    #[structopt(name = "FILE", parse(from_os_str))]
    file: PathBuf,
}

fn parse_symbols(text: &str) -> Vec<Symbol> {
    text.chars()
        .filter_map(|c| match c {
            'J' | 'j' => Some(Symbol::J),
            'K' | 'k' => Some(Symbol::K),
            '0' => Some(Symbol::SE0),
            '1' => Some(Symbol::SE1),
            _ => None,
        })
        .collect()
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    let text = fs::read_to_string(&opt.file)
        .with_context(|| format!("failed to read {:?}", opt.file))?;

    let stream = if opt.bits {
        let bits = BitVec::from_literal(&text);
        let mut stream = SymbolStream::from_bits(&bits);
        stream.append_eop();
        stream
    } else {
        SymbolStream::from_symbols(parse_symbols(&text))
    };

    match PacketCodec::try_decode(&stream) {
        Ok(packet) => println!("{:?}", packet),
        Err(e) => println!("Error: {}", e),
    }

    Ok(())
}
