#[macro_use]
extern crate clap;

use asm65::{Assembler, Options};
use clap::Arg;
use imgfile::Format;
use log::LevelFilter;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::exit;

// 0 = success, 1 = assembly error, 2 = usage error, 3 = internal error.
const EXIT_ASSEMBLY: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_INTERNAL: i32 = 3;

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the input source file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("outfile")
                .takes_value(true)
                .value_name("PATH")
                .help("Sets the output image file"),
        )
        .arg(
            Arg::with_name("format")
                .short("f")
                .long("format")
                .takes_value(true)
                .value_name("FORMAT")
                .possible_values(&["plain", "cbm", "apple", "hex"])
                .default_value("plain")
                .help("Selects the output container format"),
        )
        .arg(
            Arg::with_name("listing")
                .short("l")
                .long("listing")
                .takes_value(true)
                .value_name("PATH")
                .help("Writes a listing file"),
        )
        .arg(
            Arg::with_name("symbols")
                .short("s")
                .long("symbols")
                .help("Dumps the symbol table to stdout"),
        )
        .arg(
            Arg::with_name("include")
                .short("I")
                .takes_value(true)
                .value_name("DIR")
                .multiple(true)
                .number_of_values(1)
                .help("Prepends a directory to the include search path"),
        )
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .takes_value(true)
                .value_name("LEVEL")
                .possible_values(&["0", "1", "2", "3"])
                .default_value("1")
                .help("Sets the verbosity level"),
        )
        .arg(
            Arg::with_name("setpc")
                .long("setpc")
                .takes_value(true)
                .value_name("ADDR")
                .help("Sets the initial program counter"),
        )
        .arg(
            Arg::with_name("vicelabels")
                .long("vicelabels")
                .takes_value(true)
                .value_name("PATH")
                .help("Writes a VICE label file"),
        )
        .get_matches_safe();

    let matches = match matches {
        Ok(matches) => matches,
        Err(err) => {
            use clap::ErrorKind;
            match err.kind {
                ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => {
                    print!("{}", err);
                    exit(0);
                }
                _ => {
                    eprintln!("{}", err);
                    exit(EXIT_USAGE);
                }
            }
        }
    };

    let level = match matches.value_of("verbosity").unwrap() {
        "0" => LevelFilter::Error,
        "1" => LevelFilter::Warn,
        "2" => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    pretty_env_logger::formatted_builder()
        .filter_level(level)
        .init();

    exit(run(&matches));
}

fn run(matches: &clap::ArgMatches) -> i32 {
    let input_arg = matches.value_of("INPUT").unwrap();
    let input_path = Path::new(input_arg);
    let format: Format = matches.value_of("format").unwrap().parse().unwrap();

    let initial_pc = match matches.value_of("setpc") {
        Some(text) => match parse_number(text) {
            Some(addr) => Some(addr),
            None => {
                eprintln!("Bad address \"{}\" for --setpc", text);
                return EXIT_USAGE;
            }
        },
        None => None,
    };

    let options = Options {
        include_dirs: matches
            .values_of("include")
            .map(|values| values.map(PathBuf::from).collect())
            .unwrap_or_default(),
        initial_pc,
        listing: matches.is_present("listing"),
        ..Options::default()
    };

    // Read input file
    let mut input = String::new();
    let read = File::open(input_path)
        .and_then(|file| BufReader::new(file).read_to_string(&mut input));
    if let Err(err) = read {
        eprintln!("Reading input file \"{}\" failed: {}", input_path.display(), err);
        return EXIT_ASSEMBLY;
    }

    let mut assembler = Assembler::new(options);
    let result = assembler.assemble_str(&input, input_arg);

    for diagnostic in assembler.diagnostics() {
        eprintln!("{}", diagnostic);
    }
    if let Err(err) = result {
        eprintln!("Serious error -\n{}", err);
        return EXIT_ASSEMBLY;
    }
    if assembler.has_errors() {
        return EXIT_ASSEMBLY;
    }

    let assembly = assembler.into_assembly();

    if matches.is_present("symbols") {
        for (name, addr) in &assembly.symbols {
            println!("{}\t= ${:04x}", name, addr);
        }
    }

    let output_path: PathBuf = matches
        .value_of("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| input_path.with_extension(format.extension()));
    if let Err(err) = imgfile::write_file(&output_path, &assembly.image, format) {
        eprintln!("Writing output file \"{}\" failed: {}", output_path.display(), err);
        return EXIT_INTERNAL;
    }

    if let Some(path) = matches.value_of("vicelabels") {
        if let Err(err) = imgfile::write_vice_labels_file(path, &assembly.symbols) {
            eprintln!("Writing label file \"{}\" failed: {}", path, err);
            return EXIT_INTERNAL;
        }
    }

    if let Some(path) = matches.value_of("listing") {
        let write = File::create(path).and_then(|file| {
            asm65::write_listing(&mut BufWriter::new(file), &assembly.listing)
        });
        if let Err(err) = write {
            eprintln!("Writing listing file \"{}\" failed: {}", path, err);
            return EXIT_INTERNAL;
        }
    }

    0
}

/// Accepts the assembler's number syntax: `$` hex, `%` binary, decimal.
fn parse_number(text: &str) -> Option<u16> {
    if let Some(hex) = text.strip_prefix('$') {
        u16::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = text.strip_prefix('%') {
        u16::from_str_radix(bin, 2).ok()
    } else {
        text.parse().ok()
    }
}
