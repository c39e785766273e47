use crate::config::writer_config::MIN_FLUSH_INTERVAL;
use crate::domain::ports::Writer;
use crate::utils::error::Result;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const LINE_TERMINATOR: char = '\n';

/// Lines queued for the sender thread before producers block.
const LINE_QUEUE_SIZE: usize = 1024;

enum Command {
    Line(String),
    Flush(Sender<()>),
    Shutdown,
}

/// 把量測行交給 Writer；可選擇累積到緩衝區，由背景執行緒批次送出
pub struct Publisher {
    writer: Arc<dyn Writer>,
    queue: Option<Sender<Command>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl Publisher {
    pub fn new(writer: Arc<dyn Writer>) -> Self {
        Self {
            writer,
            queue: None,
            worker: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Every line is terminated with `\n`. Batches are sent once `capacity`
    /// bytes accumulate, when `flush_interval` passes with data pending, on
    /// `flush()` and on close.
    pub fn buffered(writer: Arc<dyn Writer>, capacity: usize, flush_interval: Duration) -> Result<Self> {
        if capacity == 0 {
            return Ok(Self::new(writer));
        }

        let flush_interval = flush_interval.max(MIN_FLUSH_INTERVAL);
        let (queue, lines) = bounded::<Command>(LINE_QUEUE_SIZE);
        let handle = {
            let writer = Arc::clone(&writer);
            thread::Builder::new()
                .name("spectator-sender".to_string())
                .spawn(move || run_sender(lines, writer, capacity, flush_interval))?
        };
        tracing::debug!(
            "Publisher buffering enabled with capacity {} and flush interval {:?}",
            capacity,
            flush_interval
        );

        Ok(Self {
            writer,
            queue: Some(queue),
            worker: Mutex::new(Some(handle)),
            closed: AtomicBool::new(false),
        })
    }

    pub fn is_buffered(&self) -> bool {
        self.queue.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn write(&self, line: &str) {
        if self.is_closed() {
            tracing::warn!("Publisher is closed, dropping: {}", line);
            return;
        }

        match &self.queue {
            Some(queue) => {
                if queue.send(Command::Line(line.to_string())).is_err() {
                    tracing::warn!("Write aborted due to shutdown, dropping: {}", line);
                }
            }
            None => send(self.writer.as_ref(), &format!("{}{}", line, LINE_TERMINATOR)),
        }
    }

    /// 立即送出緩衝區內尚未送出的資料，送出後才返回
    pub fn flush(&self) {
        if let Some(queue) = &self.queue {
            let (done, sent) = bounded(1);
            if queue.send(Command::Flush(done)).is_ok() {
                // the sender drops `done` if it stops first
                let _ = sent.recv();
            }
        }
    }

    /// Flushes pending lines, stops the sender and closes the writer.
    /// Calling it again is a no-op.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(queue) = &self.queue {
            if queue.send(Command::Shutdown).is_err() {
                tracing::debug!("Publisher sender thread already stopped");
            }

            let handle = self
                .worker
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .take();
            if let Some(handle) = handle {
                if handle.join().is_err() {
                    tracing::error!("Publisher sender thread panicked");
                }
            }
        }

        match self.writer.close() {
            Ok(()) => tracing::debug!("Writer closed successfully"),
            Err(e) => tracing::error!("Failed to close writer: {}", e),
        }
    }
}

impl Drop for Publisher {
    fn drop(&mut self) {
        self.close();
    }
}

fn send(writer: &dyn Writer, payload: &str) {
    if let Err(e) = writer.write(payload) {
        tracing::error!("Failed to send message: {}", e);
    }
}

fn send_pending(writer: &dyn Writer, pending: &mut String) {
    if !pending.is_empty() {
        send(writer, pending);
        pending.clear();
    }
}

fn run_sender(lines: Receiver<Command>, writer: Arc<dyn Writer>, capacity: usize, flush_interval: Duration) {
    let writer = writer.as_ref();
    let mut pending = String::with_capacity(capacity);
    let mut deadline = Instant::now() + flush_interval;

    loop {
        match lines.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(Command::Line(line)) => {
                pending.push_str(&line);
                pending.push(LINE_TERMINATOR);
                if pending.len() >= capacity {
                    send_pending(writer, &mut pending);
                }
            }
            Ok(Command::Flush(done)) => {
                send_pending(writer, &mut pending);
                let _ = done.send(());
            }
            Err(RecvTimeoutError::Timeout) => {
                send_pending(writer, &mut pending);
                deadline = Instant::now() + flush_interval;
            }
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                // lines that raced the shutdown still go out
                for command in lines.try_iter() {
                    if let Command::Line(line) = command {
                        pending.push_str(&line);
                        pending.push(LINE_TERMINATOR);
                    }
                }
                send_pending(writer, &mut pending);
                tracing::debug!("Publisher sender thread stopped");
                return;
            }
        }
    }
}
