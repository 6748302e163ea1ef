fn main() {
    if let Err(err) = graph_explorer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
