use hexviewlib::{ByteSource, HexView, MemorySource};
use std::env;
use std::process;

const BYTES_PER_ROW: usize = 16;

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");

    println!(" ------------------------------------------");
    println!("|  Hex View Utility  | v{version}             |");
    println!(" ------------------------------------------");
    println!("\nUsage:");
    println!("  hexdump show <input> [options]");
    println!("  hexdump find <input> <hex-pattern>");
    println!("  hexdump find-text <input> <text>");
    println!("\nOptions:");
    println!("  --offset <val>   First byte to show (default: 0)");
    println!("  --rows <val>     Number of rows to show (default: 16)");
    println!("\nExamples:");
    println!("  hexdump show firmware.bin --offset 0x100 --rows 8");
    println!("  hexdump find firmware.bin DEADBEEF");
    println!("  hexdump find-text firmware.bin MAGIC");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    println!();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = &args[1];

    // Dispatch and immediately handle results
    if let Err(e) = run_dispatch(command, &args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run_dispatch(cmd: &str, args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        "help" | "-h" | "--help" => {
            print_usage();
            Ok(())
        }
        "show" => {
            let path = args.get(2).ok_or("Missing input file path")?;
            let offset = parse_option(args, "--offset")?.unwrap_or(0);
            let rows = parse_option(args, "--rows")?.unwrap_or(16);

            let view = load_view(path)?;
            dump_rows(&view, offset, rows as usize);
            Ok(())
        }
        "find" => {
            let path = args.get(2).ok_or("Missing input file path")?;
            let pattern_str = args.get(3).ok_or("Missing hex pattern")?;
            let pattern =
                parse_str_into_bytes(pattern_str).ok_or("Pattern must be an even-length hex string")?;

            let view = load_view(path)?;
            print_matches(|from| view.find_bytes(from, &pattern), pattern.len());
            Ok(())
        }
        "find-text" => {
            let path = args.get(2).ok_or("Missing input file path")?;
            let keyword = args.get(3).ok_or("Missing search text")?;
            if keyword.is_empty() {
                return Err("Search text must not be empty".into());
            }

            let view = load_view(path)?;
            print_matches(|from| view.find_text(from, keyword, false), keyword.len());
            Ok(())
        }
        _ => {
            print_usage();
            Err(format!("Unknown command: {cmd}").into())
        }
    }
}

fn load_view(path: &str) -> Result<HexView<MemorySource>, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path).map_err(|_| format!("File not found: {path}"))?;
    Ok(HexView::new(MemorySource::new(bytes)))
}

/// Walks the source printing every match address until the pattern no longer
/// occurs.
fn print_matches(find: impl Fn(u64) -> Option<u64>, pattern_len: usize) {
    let mut from = 0;
    let mut hits = 0usize;
    while let Some(at) = find(from) {
        println!("0x{at:08X}");
        hits += 1;
        from = at + pattern_len.max(1) as u64;
    }
    println!("\nHits: {hits}");
}

fn dump_rows(view: &HexView<MemorySource>, first_byte: u64, rows: usize) {
    let digits = view.address_mode().digits();
    let len = view.source().len();

    for row in 0..rows as u64 {
        let address = first_byte + row * BYTES_PER_ROW as u64;
        if address >= len {
            break;
        }
        let bytes = view
            .source()
            .read(address, BYTES_PER_ROW)
            .unwrap_or_default();

        let mut hex_column = String::with_capacity(BYTES_PER_ROW * 3);
        let mut text_column = String::with_capacity(BYTES_PER_ROW);
        for &byte in &bytes {
            hex_column.push_str(&format!("{byte:02X} "));
            text_column.push(if (0x20..=0x7E).contains(&byte) {
                byte as char
            } else {
                '.'
            });
        }

        println!("{address:0digits$X}  {hex_column:<48} {text_column}");
    }
}

fn parse_str_into_bytes(s: &str) -> Option<Vec<u8>> {
    if s.len().is_multiple_of(2) && !s.is_empty() {
        return (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
            .collect();
    }
    None
}

fn parse_option(args: &[String], name: &str) -> Result<Option<u64>, Box<dyn std::error::Error>> {
    let Some(pos) = args.iter().position(|a| a == name) else {
        return Ok(None);
    };
    let value = args
        .get(pos + 1)
        .ok_or_else(|| format!("Missing value for {name}"))?;
    let parsed = value
        .strip_prefix("0x")
        .map_or_else(|| value.parse(), |hex| u64::from_str_radix(hex, 16))
        .map_err(|_| format!("Invalid value for {name}: {value}"))?;
    Ok(Some(parsed))
}
