use pipe_autocomplete::cli::{self, Settings, COMMAND_NAME};
use pipe_autocomplete::trace::{self, trace};
use std::time::Instant;

fn main() {
    let phase_start = Instant::now();
    eprintln!("[PHASE] autocomplete_run=start");

    let exit_code = (|| {
        let matches = cli::command().get_matches();

        let settings = match matches.subcommand() {
            Some((COMMAND_NAME, sub)) => Settings::from_matches(sub),
            _ => {
                eprintln!("Error: expected the `{}` command", COMMAND_NAME);
                return 1;
            }
        };

        if settings.trace {
            trace::enable();
        }
        trace(&format!("autocomplete: settings {:?}", settings));

        match cli::run(&settings) {
            Ok(path) => {
                eprintln!("Emitted autocomplete stub -> {}", path.display());
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        }
    })();

    eprintln!(
        "[PHASE] autocomplete_run=end ms={}",
        phase_start.elapsed().as_millis()
    );
    std::process::exit(exit_code);
}
