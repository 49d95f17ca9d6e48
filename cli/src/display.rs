use {
    crate::prelude::*,
    colored::ColoredString,
    std::{
        io::Write,
        sync::{atomic::AtomicU8, Arc},
        thread,
        time::Duration,
    },
};

const SPINNER_FRAMES: [&str; 4] = ["/", "-", "\\", "|"];
const SPINNER_INTERVAL: Duration = Duration::from_millis(100);

/// Whether decorated output is suppressed in favour of JSON.
pub(crate) fn is_json_mode() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

/// Grey line separating a title from what follows.
pub(crate) fn separator() -> ColoredString {
    "\n-=-=-=-=-=-=-=-".truecolor(100, 100, 100)
}

pub(crate) fn print_title(title: &str) {
    if !is_json_mode() {
        println!("\n{} {}{}", "▶".bold().purple(), title.bold(), separator());
    }
}

/// `[✔] msg` on stdout or `[✘] msg` on stderr.
pub(crate) fn print_status(ok: bool, msg: &str) {
    if is_json_mode() {
        return;
    }

    if ok {
        println!("[{}] {msg}", "✔".green().bold());
    } else {
        eprintln!("[{}] {msg}", "✘".red().bold());
    }
}

pub(crate) fn print_item(item: &str) {
    if !is_json_mode() {
        println!("    {} {item}", "▶".truecolor(100, 100, 100));
    }
}

/// Print the title of the currently executed command.
#[macro_export]
macro_rules! command_title {
    ($($args:tt)*) => {
        $crate::display::print_title(&format!($($args)*))
    };
}

/// Report a successful step.
#[macro_export]
macro_rules! notify_success {
    ($($args:tt)*) => {
        $crate::display::print_status(true, &format!($($args)*))
    };
}

/// Report a failed step or a soft finding.
#[macro_export]
macro_rules! notify_error {
    ($($args:tt)*) => {
        $crate::display::print_status(false, &format!($($args)*))
    };
}

/// Indented detail line under the last status.
#[macro_export]
macro_rules! item {
    ($($args:tt)*) => {
        $crate::display::print_item(&format!($($args)*))
    };
}

/// Start a spinner with a formatted message. Returns a [`LoadingHandle`]
/// that must be resolved with `success` or `error`.
///
/// [`LoadingHandle`]: crate::display::LoadingHandle
#[macro_export]
macro_rules! loading {
    ($($args:tt)*) => {
        $crate::display::LoadingHandle::start(format!($($args)*))
    };
}

const SPINNING: u8 = 0;
const SUCCEEDED: u8 = 1;
const FAILED: u8 = 2;

/// Running spinner. Dropping an unresolved handle marks it as failed so
/// that an early return never leaves the thread spinning.
pub(crate) struct LoadingHandle {
    state: Arc<AtomicU8>,
    thread: Option<thread::JoinHandle<()>>,
}

impl LoadingHandle {
    pub(crate) fn start(message: String) -> Self {
        let state = Arc::new(AtomicU8::new(SPINNING));

        if is_json_mode() {
            return Self {
                state,
                thread: None,
            };
        }

        let thread = {
            let state = Arc::clone(&state);

            thread::spawn(move || {
                for frame in SPINNER_FRAMES.iter().cycle() {
                    match state.load(Ordering::Acquire) {
                        SUCCEEDED => {
                            println!("\r[{}] {message}", "✔".green().bold());
                            break;
                        }
                        FAILED => {
                            println!("\r[{}] {message}", "✘".red().bold());
                            break;
                        }
                        _ => {
                            print!("\r[{}] {message} ", frame.purple());
                            let _ = std::io::stdout().flush();

                            thread::sleep(SPINNER_INTERVAL);
                        }
                    }
                }
            })
        };

        Self {
            state,
            thread: Some(thread),
        }
    }

    pub(crate) fn success(mut self) {
        self.finish(SUCCEEDED);
    }

    pub(crate) fn error(mut self) {
        self.finish(FAILED);
    }

    fn finish(&mut self, outcome: u8) {
        self.state.store(outcome, Ordering::Release);

        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for LoadingHandle {
    fn drop(&mut self) {
        if self.state.load(Ordering::Acquire) == SPINNING {
            self.finish(FAILED);
        }
    }
}

/// In [`JSON_MODE`], print `data` as pretty JSON on stdout. Otherwise a no-op.
pub(crate) fn json_output<T: Serialize>(data: &T) -> AnyResult<(), WaltodoCliError> {
    if !is_json_mode() {
        return Ok(());
    }

    let json = serde_json::to_string_pretty(data).map_err(|e| WaltodoCliError::Any(e.into()))?;

    println!("{json}");

    Ok(())
}
