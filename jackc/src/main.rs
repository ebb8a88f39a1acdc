use clap::Parser;
use color_print::cprintln;
use std::path::{Path, PathBuf};

#[derive(Debug, clap::Parser)]
#[clap(name = "Jack Compiler", version, about = "Compiles .jack classes to .vm files")]
struct Args {
    /// Input .jack file or a directory of .jack files
    input: PathBuf,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        cprintln!("<red,bold>error</>: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let inputs = collect_inputs(&args.input);
    if inputs.is_empty() {
        cprintln!("<yellow,bold>warning</>: no .jack files under {}", args.input.display());
        return Ok(());
    }

    for input in inputs {
        let source = std::fs::read_to_string(&input)?;
        let output = input.with_extension("vm");

        let vm_text = match jackc::compile(&source, Vec::new()) {
            Ok(out) => out,
            Err(e) => {
                cprintln!("<red,bold>error</>: {}: {}", input.display(), e);
                std::process::exit(1);
            }
        };

        std::fs::write(&output, vm_text)?;
        println!("  {} > {}", input.display(), output.display());
    }
    Ok(())
}

fn collect_inputs(path: &Path) -> Vec<PathBuf> {
    if path.is_dir() {
        let mut files: Vec<PathBuf> = std::fs::read_dir(path)
            .into_iter()
            .flatten()
            .flatten()
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "jack"))
            .collect();
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    }
}
