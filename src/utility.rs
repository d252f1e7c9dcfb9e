use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar scale used by the CLI front-ends; the engine reports
/// fractions, the bar wants integer positions.
pub const PROGRESS_BAR_TICKS: u64 = 1_000;

pub fn get_progressbar(job_name: &str, len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_message(job_name.to_string());
    bar.set_style(
        ProgressStyle::with_template(" {msg} {wide_bar} estimated remaining: {eta_precise}")
            .unwrap(),
    );
    bar
}
