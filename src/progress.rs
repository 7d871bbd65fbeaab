// Released under MIT License.
// Copyright (c) 2026 The grist_rs developers

//! Implementation of the ProgressPrinter structure for printing progress of trajectory reading.

use colored::{ColoredString, Colorize};
use std::io::Write;

/// Status of the trajectory reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    Running,
    Completed,
    Failed,
}

/// Structure defining how the progress of trajectory reading should be printed.
///
/// ## Example
/// ```no_run
/// use grist_rs::prelude::*;
///
/// let mut system = System::from_file("system.prmtop").unwrap();
///
/// let printer = ProgressPrinter::new().with_print_freq(50);
///
/// for raw_frame in system.nc_iter("trajectory.nc").unwrap().print_progress(printer) {
///     let frame = raw_frame.unwrap();
///     // perform some analysis
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ProgressPrinter {
    /// Current status of the trajectory reading.
    status: ProgressStatus,
    /// Printing frequency: the progress is printed every `print_freq` frames.
    print_freq: usize,
    /// If true, the output is colored. Default: true.
    colored: bool,
}

impl Default for ProgressPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressPrinter {
    /// Create an instance of the `ProgressPrinter` with default parameters.
    pub fn new() -> Self {
        ProgressPrinter {
            status: ProgressStatus::Running,
            print_freq: 100,
            colored: true,
        }
    }

    /// Create new `ProgressPrinter` with a specific printing frequency.
    pub fn with_print_freq(mut self, print_freq: usize) -> Self {
        self.print_freq = print_freq.max(1);
        self
    }

    /// Create new `ProgressPrinter` with specific value for `colored`.
    /// Turning coloring off makes sense when the output is redirected into a file.
    pub fn with_colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Set the status of the trajectory reading.
    pub fn set_status(&mut self, status: ProgressStatus) {
        self.status = status;
    }

    /// Print the current progress of the trajectory reading.
    pub fn print(&mut self, frame_number: usize, simulation_time: f32) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();

        match self.status {
            ProgressStatus::Running => {
                if frame_number % self.print_freq == 0 {
                    let _ = write!(
                        handle,
                        "\r[{}]   Frame {:12} | Time {:12.1} ps",
                        self.status_str("RUNNING "),
                        frame_number,
                        simulation_time,
                    );
                    let _ = handle.flush();
                }
            }
            ProgressStatus::Completed => {
                let _ = writeln!(
                    handle,
                    "\r[{}]   Frames read: {:8} | Time {:12.1} ps",
                    self.status_str("COMPLETED"),
                    frame_number,
                    simulation_time,
                );
            }
            ProgressStatus::Failed => {
                let _ = writeln!(handle, "\r[{}]", self.status_str(" FAILED "));
            }
        }
    }

    fn status_str(&self, text: &str) -> ColoredString {
        if !self.colored {
            return text.normal();
        }

        match self.status {
            ProgressStatus::Running => text.yellow(),
            ProgressStatus::Completed => text.green(),
            ProgressStatus::Failed => text.red(),
        }
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let printer = ProgressPrinter::new();

        assert_eq!(printer.status, ProgressStatus::Running);
        assert_eq!(printer.print_freq, 100);
        assert!(printer.colored);
    }

    #[test]
    fn builder() {
        let mut printer = ProgressPrinter::new()
            .with_print_freq(500)
            .with_colored(false);

        assert_eq!(printer.print_freq, 500);
        assert!(!printer.colored);

        printer.set_status(ProgressStatus::Completed);
        assert_eq!(printer.status, ProgressStatus::Completed);
    }

    #[test]
    fn print_freq_is_never_zero() {
        let printer = ProgressPrinter::new().with_print_freq(0);
        assert_eq!(printer.print_freq, 1);
    }
}
