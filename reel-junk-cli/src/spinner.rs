//! Progress spinner shown while titles resolve.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Start a ticking spinner with `msg`. Hidden entirely when `quiet`.
pub(crate) fn start(msg: impl Into<String>, quiet: bool) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if quiet {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg} [{elapsed}]")
            .expect("static pattern")
            .tick_chars("/-\\|"),
    );
    pb.set_message(msg.into());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
