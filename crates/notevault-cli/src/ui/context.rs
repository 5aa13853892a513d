//! Terminal detection for output decisions.
//!
//! `Terminal::detect` samples the process environment once; `UiContext::new`
//! applies the display flags to that sample. Keeping the two apart lets the
//! rules be tested without a terminal.

use std::io::IsTerminal;

use super::mode::OutputMode;

const FALLBACK_WIDTH: usize = 80;

/// What the process is attached to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Terminal {
    pub stdout_tty: bool,
    pub stdin_tty: bool,
    /// `TERM=dumb`
    pub dumb: bool,
    /// `NO_COLOR` is set
    pub no_color: bool,
    pub columns: Option<usize>,
}

impl Terminal {
    pub fn detect() -> Self {
        Self {
            stdout_tty: std::io::stdout().is_terminal(),
            stdin_tty: std::io::stdin().is_terminal(),
            dumb: std::env::var("TERM").map(|v| v == "dumb").unwrap_or(false),
            no_color: std::env::var_os("NO_COLOR").is_some(),
            columns: terminal_width(),
        }
    }
}

/// The `--json`, `--no-color` and `--ascii` switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayFlags {
    pub json: bool,
    pub no_color: bool,
    pub ascii: bool,
}

/// Resolved output settings for one command.
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Prompts may be shown: both stdin and stdout are terminals.
    pub interactive: bool,
    pub color: bool,
    pub unicode: bool,
    /// Columns available for tables and wrapped note bodies
    pub width: usize,
    pub mode: OutputMode,
}

impl UiContext {
    pub fn new(terminal: Terminal, flags: DisplayFlags) -> Self {
        let mode = OutputMode::resolve(flags.json, terminal.stdout_tty, terminal.dumb);
        Self {
            interactive: terminal.stdout_tty && terminal.stdin_tty,
            // Color only decorates pretty output; plain and JSON stay clean.
            color: mode.is_pretty() && !flags.no_color && !terminal.no_color,
            unicode: !flags.ascii && !terminal.dumb,
            width: terminal.columns.unwrap_or(FALLBACK_WIDTH),
            mode,
        }
    }

    pub fn from_env(flags: DisplayFlags) -> Self {
        Self::new(Terminal::detect(), flags)
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// `COLUMNS` first, then the size of the terminal on stdout.
fn terminal_width() -> Option<usize> {
    if let Some(width) = std::env::var("COLUMNS")
        .ok()
        .and_then(|cols| cols.parse::<usize>().ok())
        .filter(|width| *width > 0)
    {
        return Some(width);
    }

    #[cfg(unix)]
    {
        use std::mem::MaybeUninit;

        let mut winsize = MaybeUninit::<libc::winsize>::uninit();
        // SAFETY: TIOCGWINSZ only writes into the provided winsize
        let result =
            unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, winsize.as_mut_ptr()) };
        if result == 0 {
            // SAFETY: ioctl succeeded, so winsize is initialised
            let ws = unsafe { winsize.assume_init() };
            if ws.ws_col > 0 {
                return Some(ws.ws_col as usize);
            }
        }
    }

    None
}
