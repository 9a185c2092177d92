use csvi::cmdline;

fn main() {
    let args = std::env::args().collect();
    if let Err(e) = cmdline::launch(args) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
