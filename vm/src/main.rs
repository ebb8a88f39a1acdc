use clap::Parser;
use color_print::cprintln;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Debug, clap::Parser)]
#[clap(name = "Hack VM Translator", version, about = "Translates .vm files to .asm")]
struct Args {
    /// Input .vm file or a directory of .vm files
    input: PathBuf,

    /// Output file (defaults to <input>.asm)
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Skip the SP/Sys.init bootstrap (single-function fixtures)
    #[clap(long)]
    no_bootstrap: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        cprintln!("<red,bold>error</>: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), hackvm::Error> {
    let inputs = collect_inputs(&args.input);
    if inputs.is_empty() {
        cprintln!("<yellow,bold>warning</>: no .vm files under {}", args.input.display());
        return Ok(());
    }

    let output = match &args.output {
        Some(path) => path.clone(),
        None => {
            if args.input.is_dir() {
                let stem = args.input.file_name().unwrap_or_default();
                args.input.join(stem).with_extension("asm")
            } else {
                args.input.with_extension("asm")
            }
        }
    };

    let file = std::fs::File::create(&output)
        .map_err(|e| hackvm::Error::FileCreate(output.display().to_string(), e))?;
    let mut writer = hackvm::CodeWriter::new(BufWriter::new(file));

    if !args.no_bootstrap {
        writer.write_bootstrap()?;
    }

    for input in &inputs {
        let text = std::fs::read_to_string(input)
            .map_err(|e| hackvm::Error::FileOpen(input.display().to_string(), e))?;
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        hackvm::translate(&mut writer, &stem, &text)?;
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
            .filter(|p| p.extension().is_some_and(|ext| ext == "vm"))
            .collect();
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    }
}
