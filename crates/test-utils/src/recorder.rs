use std::sync::{Arc, Mutex};
use std::time::Instant;

use waverun::engine::TaskLogger;

/// One lifecycle notification as seen by [`RecordingLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    Start(String),
    End(String, bool),
    /// `(message, rendered error)`
    Error(String, String),
}

/// Logger that keeps every notification, in call order.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl RecordingLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Names passed to `start_task`, in order.
    pub fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                LogEvent::Start(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                LogEvent::Error(msg, err) => Some((msg, err)),
                _ => None,
            })
            .collect()
    }

    /// The `success` flag of the `end_task` call for `name`, if any.
    pub fn outcome_of(&self, name: &str) -> Option<bool> {
        self.events().into_iter().find_map(|e| match e {
            LogEvent::End(n, success) if n == name => Some(success),
            _ => None,
        })
    }

    fn push(&self, event: LogEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl TaskLogger for RecordingLogger {
    fn start_task(&self, name: &str) {
        self.push(LogEvent::Start(name.to_string()));
    }

    fn end_task(&self, name: &str, success: bool) {
        self.push(LogEvent::End(name.to_string(), success));
    }

    fn error(&self, message: &str, err: &anyhow::Error) {
        self.push(LogEvent::Error(message.to_string(), format!("{err:#}")));
    }
}

/// Whether a journal entry marks a body starting or finishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Start,
    Finish,
}

#[derive(Debug, Clone)]
pub struct JournalEntry {
    pub task: String,
    pub mark: Mark,
    pub at: Instant,
}

/// Shared log written by task bodies themselves.
///
/// Unlike [`RecordingLogger`], which sees what the engine reports, the
/// journal shows what the bodies actually did and when.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<JournalEntry>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, task: &str, mark: Mark) {
        self.entries.lock().unwrap().push(JournalEntry {
            task: task.to_string(),
            mark,
            at: Instant::now(),
        });
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// `(task, mark)` pairs in the order they were recorded.
    pub fn sequence(&self) -> Vec<(String, Mark)> {
        self.entries()
            .into_iter()
            .map(|e| (e.task, e.mark))
            .collect()
    }

    pub fn index_of(&self, task: &str, mark: Mark) -> Option<usize> {
        self.entries()
            .iter()
            .position(|e| e.task == task && e.mark == mark)
    }

    /// Names of bodies that started, in order.
    pub fn started(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.mark == Mark::Start)
            .map(|e| e.task)
            .collect()
    }

    pub fn ran(&self, task: &str) -> bool {
        self.index_of(task, Mark::Start).is_some()
    }

    /// `true` if `first` finished before `second` started.
    pub fn finished_before_started(&self, first: &str, second: &str) -> bool {
        match (
            self.index_of(first, Mark::Finish),
            self.index_of(second, Mark::Start),
        ) {
            (Some(f), Some(s)) => f < s,
            _ => false,
        }
    }
}
