fn main() {
    if let Err(err) = taskflow_layout::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
