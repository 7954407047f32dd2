fn main() {
    if let Err(err) = csv_cleanse::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
