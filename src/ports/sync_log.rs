use std::fmt;

use log::Level;

/// Sink for the messages the sync engine emits while it runs.
///
/// Components receive the sink as a parameter instead of writing to a process-wide
/// logger, so a run can be observed (and asserted on) in isolation.
pub trait SyncLog: Send + Sync {
    fn log(&self, level: Level, args: fmt::Arguments<'_>);

    fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }
}

/// Forwards sync messages to the `log` facade under the `sync` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacade;

impl SyncLog for LogFacade {
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        log::log!(target: "sync", level, "{}", args);
    }
}
