//! Example of encoding a small binary into a debug.exe script

use emx_dbgscript::{Command, Encoder, TrailingRun};

fn main() -> anyhow::Result<()> {
    println!("=== Debug Script Example ===\n");

    // A tiny DOS .com program: mov ah,4c / int 21, with some zero padding
    // and a long nonzero streak that spans two `e` lines
    let mut program = vec![0xb4, 0x4c, 0xcd, 0x21, 0x00, 0x00];
    program.extend(1..=25u8);

    let encoder = Encoder::new();
    let script = encoder.build(&program, "exit.com")?;

    println!("Script:");
    println!("---");
    print!("{}", script);
    println!("---");

    println!("\nCommands: {}", script.commands().len());
    for run in script.runs() {
        println!("  e {:x}: {} byte(s)", run.address, run.len());
    }
    assert_eq!(script.size(), Some(program.len() as u32));
    assert!(matches!(script.commands().last(), Some(Command::Quit)));

    // The legacy policy drops the 5 bytes left after the full 20-byte run
    let legacy = Encoder::new()
        .with_trailing_run(TrailingRun::Drop)
        .build(&program, "exit.com")?;
    println!(
        "\nLegacy output keeps {} of {} write command(s)",
        legacy.runs().count(),
        script.runs().count()
    );

    Ok(())
}
