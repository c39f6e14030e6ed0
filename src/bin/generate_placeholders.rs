//! Placeholder sprite generator
//!
//! Writes one image per posture to `assets/fighters/placeholder/`.
//!
//! Usage:
//!   cargo run --bin generate-placeholders
//!   cargo run --bin generate-placeholders -- --out some/assets

use std::path::PathBuf;

use fightgame::generate::placeholders;
use fightgame::ui::arena::ASSETS_DIR;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut root = PathBuf::from(ASSETS_DIR);

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--out" => match iter.next() {
                Some(dir) => root = PathBuf::from(dir),
                None => {
                    eprintln!("--out needs a directory");
                    std::process::exit(2);
                }
            },
            "--help" | "-h" => {
                println!("Usage: generate-placeholders [--out <ASSETS_DIR>]");
                return;
            }
            other => {
                eprintln!("Unknown argument '{}'", other);
                std::process::exit(2);
            }
        }
    }

    println!("=== Placeholder Sprite Generator ===\n");
    match placeholders::run(&root) {
        Ok(count) => println!("\nWrote {} images.", count),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
