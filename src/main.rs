use bpekit::Tokenizer;
use env_logger::Env;
use log::LevelFilter;
use rayon::prelude::*;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const TOKENIZER_ENV: &str = "BPEKIT_TOKENIZER";

struct Args {
    tokenizer: Option<String>,
    decode: bool,
    special: bool,
    tokens: bool,
    verbose: u8,
    help: bool,
    version: bool,
    paths: Vec<String>,
}

fn parse_args() -> Args {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let mut args = Args {
        tokenizer: None,
        decode: false,
        special: true,
        tokens: false,
        verbose: 0,
        help: false,
        version: false,
        paths: Vec::new(),
    };

    let mut i = 0;
    while i < argv.len() {
        match argv[i].as_str() {
            "-V" | "--version" => args.version = true,
            "-h" | "--help" => args.help = true,
            "-d" | "--decode" => args.decode = true,
            "--no-special" => args.special = false,
            "--tokens" => args.tokens = true,
            "-v" | "--verbose" => args.verbose = args.verbose.saturating_add(1),
            "-vv" => args.verbose = args.verbose.saturating_add(2),
            "-t" | "--tokenizer" => {
                i += 1;
                if i >= argv.len() {
                    eprintln!("Error: --tokenizer requires a value");
                    std::process::exit(1);
                }
                args.tokenizer = Some(argv[i].clone());
            }
            s if s.starts_with('-') => {
                eprintln!("Error: unknown option: {}", s);
                std::process::exit(1);
            }
            _ => args.paths.push(argv[i].clone()),
        }
        i += 1;
    }
    args
}

fn print_help() {
    println!(
        "Usage: bpekit [options] [path...]\n\
         \n\
         Encode text to token IDs (or decode IDs to text) with a GPT-2 style\n\
         byte-level BPE tokenizer.json.\n\
         \n\
         Options:\n\
         \x20 -t, --tokenizer <path>  tokenizer.json to load (default: ${})\n\
         \x20 -d, --decode            Read whitespace-separated IDs and print text\n\
         \x20 --no-special            Encode without the trailing EOS pair; decode keeping EOS\n\
         \x20 --tokens                Print token strings instead of IDs\n\
         \x20 -v, --verbose           More logging (repeatable; RUST_LOG also works)\n\
         \x20 -V, --version           Show version\n\
         \x20 -h, --help              Show this help\n\
         \n\
         When no paths are given, reads from stdin. Several files are processed\n\
         in parallel and each output line is prefixed with its path.",
        TOKENIZER_ENV
    );
}

fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Info);
        }
        2 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }
    let _ = builder.try_init();
}

fn parse_ids(text: &str) -> Result<Vec<i64>, String> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().map_err(|_| format!("not a token ID: {:?}", s)))
        .collect()
}

fn run(tokenizer: &Tokenizer, args: &Args, text: &str) -> Result<String, String> {
    if args.decode {
        let ids = parse_ids(text)?;
        return Ok(tokenizer.decode(&ids, args.special));
    }
    if args.tokens {
        return Ok(tokenizer.tokenize(text).join(" "));
    }
    let ids = tokenizer.encode(text, args.special);
    Ok(ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(" "))
}

fn main() {
    let args = parse_args();

    if args.version {
        println!("bpekit {}", VERSION);
        return;
    }
    if args.help {
        print_help();
        return;
    }
    init_logging(args.verbose);

    let tokenizer_path = args
        .tokenizer
        .clone()
        .or_else(|| std::env::var(TOKENIZER_ENV).ok())
        .unwrap_or_else(|| {
            eprintln!("Error: no tokenizer given (use --tokenizer or set {})", TOKENIZER_ENV);
            std::process::exit(1);
        });
    let tokenizer = Tokenizer::from_file(&tokenizer_path).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    struct Input {
        name: Option<String>,
        text: String,
    }

    let inputs: Vec<Input> = if args.paths.is_empty() {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).unwrap_or_else(|e| {
            eprintln!("Error reading stdin: {}", e);
            std::process::exit(1);
        });
        vec![Input { name: None, text: buf }]
    } else {
        args.paths
            .iter()
            .map(|p| {
                let path = PathBuf::from(p);
                if path.is_dir() {
                    eprintln!("Error: {}: Is a directory", p);
                    std::process::exit(1);
                }
                let text = fs::read_to_string(&path).unwrap_or_else(|e| {
                    eprintln!("Error reading {}: {}", path.display(), e);
                    std::process::exit(1);
                });
                Input {
                    name: Some(p.clone()),
                    text,
                }
            })
            .collect()
    };

    let run_one = |input: &Input| run(&tokenizer, &args, &input.text);
    let results: Vec<Result<String, String>> = if inputs.len() > 1 {
        inputs.par_iter().map(run_one).collect()
    } else {
        inputs.iter().map(run_one).collect()
    };

    let labelled = inputs.len() > 1;
    for (input, result) in inputs.iter().zip(results) {
        match result {
            Ok(out) if labelled => println!("{}: {}", input.name.as_deref().unwrap_or(""), out),
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error: {}: {}", input.name.as_deref().unwrap_or("stdin"), e);
                std::process::exit(1);
            }
        }
    }
}
