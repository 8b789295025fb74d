use anyhow::Result;
use clap::Parser;

use scanray::cli::Cli;
use scanray::renderer;
use scanray::settings::Settings;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    cli.apply(&mut settings);

    let mut renderer = renderer::create(cli.mode, settings);
    renderer.init()?;
    renderer.render()?;

    Ok(())
}
