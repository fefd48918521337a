use schemer::environment::Environment;
use schemer::interpreter::{interpret, Status};
use schemer::cmdline;
use std::fs;
use std::process;

fn main() {
    pretty_env_logger::init();

    let env = Environment::global();

    // batch mode: interpret one file, then leave
    if let Some(path) = std::env::args().nth(1) {
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                eprintln!("couldn't read {}: {}", path, e);
                process::exit(1);
            }
        };
        if interpret(&contents, &env) == Status::Error {
            process::exit(1);
        }
        return;
    }

    let interface = match cmdline::setup() {
        Ok(interface) => interface,
        Err(e) => {
            eprintln!("couldn't start the repl: {}", e);
            process::exit(1);
        }
    };
    cmdline::repl(&interface, |line| interpret(line, &env));
    cmdline::save_history(&interface).ok();
}
