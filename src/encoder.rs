use std::env;
use std::path::Path;

use log::{error, info};

use huffpack::{BitPacker, encode_file};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        let program = args.first().map_or("encode", String::as_str);
        println!("Usage: {} <input_file> <output_file>", program);
        std::process::exit(1);
    }

    let input_filepath = Path::new(&args[1]);
    let output_filepath = Path::new(&args[2]);

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = encode_file(input_filepath, output_filepath, &BitPacker, &mut stdout) {
        error!("Encoding failed: {}", e);
        std::process::exit(1);
    }

    info!(
        "Encoded {} to {}",
        input_filepath.display(),
        output_filepath.display()
    );
}
