use std::process;

use salesflow::pipeline::{self, Config};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = std::env::args()
        .nth(1)
        .map(Config::with_data_dir)
        .unwrap_or_default();
    match pipeline::run(&config) {
        Ok(summary) => println!("Reports generated successfully: {summary}"),
        Err(err) => {
            eprintln!("Failed to generate reports: {err}");
            process::exit(1);
        }
    }
}
