use std::env;
use std::fs;
use std::process;

const OUTPUT_PATH: &str = "out.c";

fn main() {
  let args: Vec<String> = env::args().collect();
  if args.len() != 2 {
    let program = args.first().map(String::as_str).unwrap_or("teenyc");
    eprintln!("usage: {program} <source-file>");
    process::exit(1);
  }

  let source = match fs::read_to_string(&args[1]) {
    Ok(text) => text,
    Err(err) => {
      eprintln!("cannot read {}: {err}", args[1]);
      process::exit(1);
    }
  };

  match teenyc::compile(&source) {
    Ok(output) => {
      if let Err(err) = fs::write(OUTPUT_PATH, output) {
        eprintln!("cannot write {OUTPUT_PATH}: {err}");
        process::exit(1);
      }
      println!("compiled {} -> {OUTPUT_PATH}", args[1]);
    }
    Err(err) => {
      eprintln!("{err}");
      process::exit(1);
    }
  }
}
