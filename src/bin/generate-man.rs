// renders the msgrule(1) man page from the clap definition
// usage: generate-man [OUT_DIR]   (defaults to ./man)

use std::path::PathBuf;

use clap::CommandFactory;
use clap_mangen::Man;
use msgrule::cli::Cli;

fn main() -> std::io::Result<()> {
    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    std::fs::create_dir_all(&out_dir)?;

    let mut page = Vec::new();
    Man::new(Cli::command()).render(&mut page)?;

    let path = out_dir.join("msgrule.1");
    std::fs::write(&path, page)?;

    println!("Generated {}", path.display());
    Ok(())
}
