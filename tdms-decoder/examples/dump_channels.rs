//! Print the group/channel layout of a TDMS file
//!
//! Usage: cargo run --example dump_channels -- recording.tdms

use std::path::PathBuf;
use tdms_decoder::TdmsFile;

fn main() {
    env_logger::init();

    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("usage: dump_channels <file.tdms>");
        std::process::exit(2);
    };

    let file = match TdmsFile::open(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("failed to read {:?}: {}", path, e);
            std::process::exit(1);
        }
    };

    println!("{:?}", path);
    for (name, value) in &file.properties {
        println!("  {}: {}", name, value);
    }
    for group in &file.groups {
        println!("  Group {:?}", group.name);
        for channel in &group.channels {
            println!(
                "    {:?}: {} samples of {}{}",
                channel.name,
                channel.len(),
                channel.data_type,
                channel
                    .unit()
                    .map(|u| format!(" [{}]", u))
                    .unwrap_or_default()
            );
        }
    }
}
