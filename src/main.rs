//! itlab-sync main entrypoint.

use itlab_sync::run;
use itlab_sync::ui::messages;

fn main() {
    if let Err(e) = run() {
        messages::error(format!("Error: {e}"));
        std::process::exit(1);
    }
}
