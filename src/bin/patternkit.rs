fn main() {
    if let Err(err) = patternkit::cli::run_cli() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
