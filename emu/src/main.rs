use clap::Parser;
use color_print::cprintln;
use std::path::PathBuf;

#[derive(Debug, clap::Parser)]
#[clap(name = "Hack Emulator", version, about = "Runs .hack binary images")]
struct Args {
    /// Input .hack file
    input: PathBuf,

    /// Maximum number of instruction steps
    #[clap(short, long, default_value = "100000")]
    steps: usize,

    /// Dump this many RAM words after the run
    #[clap(short, long, default_value = "16")]
    dump: usize,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        cprintln!("<red,bold>error</>: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(&args.input)?;
    let mut machine = hackemu::Machine::from_text(&text)?;

    let steps = machine.run(args.steps);
    println!("{} steps, PC = {}", steps, machine.pc);

    for (addr, value) in machine.ram.iter().take(args.dump).enumerate() {
        println!("  RAM[{addr:>4}] = {value}");
    }
    Ok(())
}
