use std::env;
use std::fs;
use std::path::Path;

use log::{error, info, warn};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        let program = args.first().map_or("decode", String::as_str);
        println!("Usage: {} <input_file> <output_file>", program);
        println!("  <input_file>:  path to the encoded file.");
        println!("  <output_file>: path to write the decoded output.");
        std::process::exit(1);
    }

    let input_filepath = Path::new(&args[1]);
    let output_filepath = Path::new(&args[2]);

    info!("--- Start Decoding ---");
    let written = match huffpack::unpack(input_filepath, output_filepath) {
        Ok(n) => n,
        Err(e) => {
            error!("Failed to decode {}: {}", input_filepath.display(), e);
            std::process::exit(1);
        }
    };

    let input_size = match fs::metadata(input_filepath) {
        Ok(m) => format!("{} bytes", m.len()),
        Err(e) => {
            warn!("Could not stat {}: {}", input_filepath.display(), e);
            "size unknown".to_string()
        }
    };
    println!(
        "decoding successful.\n\
         input file:  {} ({})\n\
         output file: {} ({} bytes)",
        input_filepath.display(),
        input_size,
        output_filepath.display(),
        written
    );

    info!("--- End ---");
}
