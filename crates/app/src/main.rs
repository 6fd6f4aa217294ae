use clap::Parser;

mod cli;
mod html;
mod vision;

fn main() {
    vision::init_tracing();
    if let Err(err) = cli::run(cli::Cli::parse()) {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}
