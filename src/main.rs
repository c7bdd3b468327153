mod cli;

use crate::cli::Cli;
use crate::cli::app::App;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    cli::init_tracing(args.verbose);

    let app = App::new(&args)?;
    let mut stdout = std::io::stdout().lock();
    app.run(args.command, &mut stdout)
}
