//! Progress bars for the k-mer counting passes, built with the `indicatif` crate.

use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar of a specified length and styling, with a terminal message.
pub fn progress_bar_msg(len: u64) -> ProgressBar {
    let progress_bar = ProgressBar::new(len);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template(concat!(
                "[{elapsed_precise}] {bar:40.cyan/blue} {percent}% ",
                "[{human_pos}/{human_len} sequences] [Remaining: {eta}] [{msg}]"
            ))
            .expect("Invalid progress style."),
    );

    progress_bar
}
