fn main() {
    if let Err(e) = healthai_lib::run() {
        eprintln!("healthai: {e}");
        std::process::exit(1);
    }
}
