//! Line-oriented processing chains.
//!
//! A chain is built from an emitter (the reader), any number of filters
//! subscribed to each other in order, and a subscriber at the end (the
//! writer). Dispatch is synchronous: each line flows through the whole
//! chain before the reader moves on.

pub mod filters;
pub mod mini_parser;

pub use filters::SentinelFilter;
pub use mini_parser::MiniParser;

use std::cell::RefCell;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::errors::ForgeError;
use crate::events::{Signal, Subscription};

/// Reads a file line by line, emitting each line on its output channel.
pub struct LineReader {
    path: PathBuf,
    out: Signal<str>,
}

impl LineReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            out: Signal::new(),
        }
    }

    pub fn output(&self) -> &Signal<str> {
        &self.out
    }

    /// Read the whole file, pushing every line through the chain.
    pub fn run(&self) -> Result<(), ForgeError> {
        let read_failed = |source| ForgeError::ReadFailed {
            path: self.path.display().to_string(),
            source,
        };
        let file = File::open(&self.path).map_err(read_failed)?;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(read_failed)?;
            self.out.emit(&line);
        }
        Ok(())
    }
}

struct WriterSink {
    out: BufWriter<File>,
    path: PathBuf,
    error: Option<std::io::Error>,
}

/// End of a chain: appends every received line, plus a newline, to a file.
///
/// Write errors inside the callback are held until [`finish`](Self::finish),
/// which flushes and surfaces the first one.
pub struct LineWriter {
    sink: Rc<RefCell<WriterSink>>,
    subscriptions: Vec<Subscription>,
}

impl LineWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ForgeError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| ForgeError::WriteFailed {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            sink: Rc::new(RefCell::new(WriterSink {
                out: BufWriter::new(file),
                path,
                error: None,
            })),
            subscriptions: Vec::new(),
        })
    }

    pub fn subscribe_to(&mut self, upstream: &Signal<str>) {
        let sink = Rc::clone(&self.sink);
        self.subscriptions.push(upstream.connect(move |line: &str| {
            let mut sink = sink.borrow_mut();
            let sink = &mut *sink;
            if sink.error.is_some() {
                return;
            }
            if let Err(error) = writeln!(sink.out, "{line}") {
                sink.error = Some(error);
            }
        }));
    }

    /// Disconnect, flush, and report the first write error, if any.
    pub fn finish(mut self) -> Result<(), ForgeError> {
        self.subscriptions.clear();
        let mut sink = self.sink.borrow_mut();
        let path = sink.path.display().to_string();
        if let Some(source) = sink.error.take() {
            return Err(ForgeError::WriteFailed { path, source });
        }
        sink.out
            .flush()
            .map_err(|source| ForgeError::WriteFailed { path, source })
    }
}
