//! Process-wide log sink with an explicit lifecycle.
//!
//! The `log` facade accepts a logger only once per process. A forwarding
//! logger is registered the first time a [`LogContext`] is initialised; it
//! hands records to whatever `env_logger` sink is current. [`LogContext::init`]
//! installs a sink and [`LogContext::teardown`] removes it again, closing the
//! log file.
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Once, RwLock};

use log::{LevelFilter, Log, Metadata, Record};

use crate::kernel::constants;
use crate::storage::LoaderConfig;

static SINK: RwLock<Option<env_logger::Logger>> = RwLock::new(None);
static FORWARDER: Forwarder = Forwarder;
static REGISTER: Once = Once::new();

struct Forwarder;

impl Log for Forwarder {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        SINK.read()
            .map(|sink| sink.as_ref().is_some_and(|logger| logger.enabled(metadata)))
            .unwrap_or(false)
    }

    fn log(&self, record: &Record<'_>) {
        if let Ok(sink) = SINK.read() {
            if let Some(logger) = sink.as_ref() {
                if logger.matches(record) {
                    logger.log(record);
                }
            }
        }
    }

    fn flush(&self) {
        if let Ok(sink) = SINK.read() {
            if let Some(logger) = sink.as_ref() {
                logger.flush();
            }
        }
    }
}

/// Where log records go while a context is active.
enum Output {
    File(File),
    Stdout,
}

impl Output {
    fn write_raw(&mut self, text: &str) -> io::Result<()> {
        match self {
            Output::File(file) => {
                file.write_all(text.as_bytes())?;
                file.flush()
            }
            Output::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(text.as_bytes())?;
                stdout.flush()
            }
        }
    }
}

/// The logging context of one loader.
#[derive(Default)]
pub struct LogContext {
    output: Option<Output>,
}

impl LogContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.output.is_some()
    }

    /// Open the log (the file at `log_file`, or stdout when configured) and
    /// route the `log` facade into it. Does nothing when already active.
    pub fn init(&mut self, log_file: &Path, config: &LoaderConfig) -> io::Result<()> {
        if self.is_active() {
            return Ok(());
        }

        let mut output = if config.log_to_stdout {
            Output::Stdout
        } else {
            Output::File(File::create(log_file)?)
        };
        output.write_raw(&header())?;

        let mut builder = env_logger::Builder::new();
        builder
            .write_style(env_logger::WriteStyle::Never)
            .format_timestamp_secs()
            .filter_level(LevelFilter::Info)
            .parse_default_env();
        if let Some(level) = config.level_filter() {
            builder.filter_level(level);
        }
        match &output {
            Output::File(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file.try_clone()?)));
            }
            Output::Stdout => {
                builder.target(env_logger::Target::Stdout);
            }
        }
        let logger = builder.build();
        let level = logger.filter();

        REGISTER.call_once(|| {
            if log::set_logger(&FORWARDER).is_err() {
                eprintln!("{}: a logger is already installed, the log sink will stay silent", constants::HOST_NAME);
            }
        });
        if let Ok(mut sink) = SINK.write() {
            *sink = Some(logger);
        }
        log::set_max_level(level);

        self.output = Some(output);
        Ok(())
    }

    /// Write the footer and close the log. Does nothing when not active.
    pub fn teardown(&mut self) {
        let Some(mut output) = self.output.take() else {
            return;
        };

        log::logger().flush();
        if let Ok(mut sink) = SINK.write() {
            *sink = None;
        }
        log::set_max_level(LevelFilter::Off);

        if let Err(e) = output.write_raw(&footer()) {
            eprintln!("{}: failed to finish the log: {}", constants::HOST_NAME, e);
        }
    }
}

impl Drop for LogContext {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn version_string() -> String {
    format!(
        "{}.{}.{}{}",
        constants::HOST_VERSION_MAJOR,
        constants::HOST_VERSION_MINOR,
        constants::HOST_VERSION_REVISION,
        if constants::HOST_VERSION_IS_DEV { " [Development Build]" } else { "" }
    )
}

fn header() -> String {
    format!("==== {} {} ====\n", constants::HOST_NAME, version_string())
}

fn footer() -> String {
    format!(
        "\nLogging finished.\nPowered by {} {} ({})\n",
        constants::HOST_NAME,
        version_string(),
        constants::PROJECT_URL
    )
}
