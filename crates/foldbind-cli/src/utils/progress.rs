use indicatif::{ProgressBar, ProgressStyle};
use foldbind::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

const SPINNER_TICK_MS: u64 = 80;

/// Renders backend and tool attempts as a spinner on stderr.
///
/// Status lines that must survive the spinner (backend failures) are printed
/// above it.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(indicatif::ProgressDrawTarget::stderr())
    }

    fn with_draw_target(target: indicatif::ProgressDrawTarget) -> Self {
        let pb = ProgressBar::new(0).with_style(Self::spinner_style());
        pb.set_draw_target(target);
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::BackendStart { name, index, total } => {
                    pb_guard.reset();
                    pb_guard.set_style(Self::spinner_style());
                    pb_guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb_guard.set_message(format!("[{}/{}] Trying {}...", index + 1, total, name));
                }
                Progress::BackendFailed { name, reason } => {
                    let line = backend_failure_line(&name, &reason);
                    pb_guard.suspend(|| eprintln!("{}", line));
                }
                Progress::BackendSucceeded { name } => {
                    pb_guard.disable_steady_tick();
                    pb_guard.finish_and_clear();
                    debug!("{} succeeded.", name);
                }
                Progress::ToolStart { name } => {
                    pb_guard.reset();
                    pb_guard.set_style(Self::spinner_style());
                    pb_guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb_guard.set_message(format!("Running {}...", name));
                }
                Progress::ToolFinish { name, success } => {
                    pb_guard.disable_steady_tick();
                    pb_guard.finish_and_clear();
                    debug!(tool = %name, success, "Pose tool finished.");
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

/// Printed once per failed structure backend. The spinner is suspended around
/// it so the line also reaches a stderr that is not a terminal.
fn backend_failure_line(name: &str, reason: &str) -> String {
    format!("[WARNING] {} failed: {}", name, reason)
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn hidden() -> CliProgressHandler {
        CliProgressHandler::with_draw_target(indicatif::ProgressDrawTarget::hidden())
    }

    #[test]
    fn handler_initializes_in_a_finished_state() {
        let handler = hidden();
        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
    }

    #[test]
    fn backend_start_sets_a_numbered_message() {
        let handler = hidden();
        let callback = handler.get_callback();

        callback(Progress::BackendStart {
            name: "OpenFold".into(),
            index: 1,
            total: 3,
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "[2/3] Trying OpenFold...");
            assert!(!pb.is_finished());
        }

        callback(Progress::BackendSucceeded {
            name: "OpenFold".into(),
        });
        assert!(handler.pb.lock().unwrap().is_finished());
    }

    #[test]
    fn backend_failure_is_reported_without_finishing_the_spinner() {
        assert_eq!(
            backend_failure_line("ColabFold", "colabfold_batch not found in PATH."),
            "[WARNING] ColabFold failed: colabfold_batch not found in PATH."
        );

        let handler = hidden();
        let callback = handler.get_callback();
        callback(Progress::BackendStart {
            name: "ColabFold".into(),
            index: 0,
            total: 3,
        });
        callback(Progress::BackendFailed {
            name: "ColabFold".into(),
            reason: "exit status 1".into(),
        });
        assert!(!handler.pb.lock().unwrap().is_finished());
    }

    #[test]
    fn tool_events_toggle_the_spinner() {
        let handler = hidden();
        let callback = handler.get_callback();

        callback(Progress::ToolStart {
            name: "umol".into(),
        });
        assert_eq!(handler.pb.lock().unwrap().message(), "Running umol...");

        callback(Progress::ToolFinish {
            name: "umol".into(),
            success: false,
        });
        assert!(handler.pb.lock().unwrap().is_finished());
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = hidden();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::ToolStart {
                name: "equibind".into(),
            });
            callback(Progress::ToolFinish {
                name: "equibind".into(),
                success: true,
            });
        })
        .join()
        .unwrap();

        assert!(handler.pb.lock().unwrap().is_finished());
    }
}
