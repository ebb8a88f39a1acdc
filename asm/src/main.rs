use clap::Parser;
use color_print::cprintln;
use std::path::{Path, PathBuf};

#[derive(Debug, clap::Parser)]
#[clap(name = "Hack Assembler", version, about = "Assembles .asm files to .hack binary")]
struct Args {
    /// Input .asm file or a directory of .asm files
    input: PathBuf,

    /// Output file (single-file input only; defaults to <input>.hack)
    #[clap(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        cprintln!("<red,bold>error</>: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), hackasm::Error> {
    let inputs = collect_inputs(&args.input);
    if inputs.is_empty() {
        cprintln!("<yellow,bold>warning</>: no .asm files under {}", args.input.display());
        return Ok(());
    }

    for input in inputs {
        let output = match &args.output {
            Some(path) => path.clone(),
            None => input.with_extension("hack"),
        };
        assemble_file(&input, &output)?;
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
            .filter(|p| p.extension().is_some_and(|ext| ext == "asm"))
            .collect();
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    }
}

fn assemble_file(input: &Path, output: &Path) -> Result<(), hackasm::Error> {
    let name = input.display().to_string();
    let text = std::fs::read_to_string(input)
        .map_err(|e| hackasm::Error::FileOpen(name.clone(), e))?;

    let commands = hackasm::parse(&name, &text)?;
    let words = hackasm::assemble(&commands)?;

    std::fs::write(output, hackasm::to_text(&words))
        .map_err(|e| hackasm::Error::FileWrite(output.display().to_string(), e))
}
