use signal_hook::{
    consts::{SIGINT, SIGTERM},
    iterator::Signals,
};

/// Exit cleanly when asked to stop.
///
/// In-flight inspections are not awaited. The output file is only ever
/// replaced by a single write, so there is nothing to flush.
pub fn handle_termination() {
    let mut signals =
        Signals::new([SIGINT, SIGTERM]).expect("No signals :(. This really should never happen");

    std::thread::spawn(move || {
        if let Some(signal) = signals.forever().next() {
            let _ = sd_notify::notify(true, &[sd_notify::NotifyState::Stopping]);
            log::info!("Received signal {signal}, stopping");
            std::process::exit(0);
        }
    });
}
