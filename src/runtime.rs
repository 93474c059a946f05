use crate::features::range::RangeSource;
use crate::features::resolver::{FragmentedRangeResolver, ResolveError};
use crate::features::series::{DailyRecord, DailySeries};
use chrono::NaiveDate;
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, info};

pub type ResolveReply = Result<Vec<DailyRecord>, ResolveError>;

#[derive(Clone, Debug)]
pub enum ControlMessage {
    Resolve {
        start: NaiveDate,
        end: NaiveDate,
        reply: Sender<ResolveReply>,
    },
    ReplaceCache(Arc<DailySeries>),
    Stop,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("resolver worker is no longer running")]
    WorkerGone,
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

pub struct ResolverHandle {
    pub sender: Sender<ControlMessage>,
    pub join: Option<JoinHandle<()>>,
}

impl ResolverHandle {
    /// Blocks until the worker answers.
    pub fn resolve(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyRecord>, RuntimeError> {
        let (reply, response) = crossbeam_channel::bounded(1);
        self.sender
            .send(ControlMessage::Resolve { start, end, reply })
            .map_err(|_| RuntimeError::WorkerGone)?;
        let records = response.recv().map_err(|_| RuntimeError::WorkerGone)??;
        Ok(records)
    }

    pub fn replace_cache(&self, cache: Arc<DailySeries>) -> Result<(), RuntimeError> {
        self.sender
            .send(ControlMessage::ReplaceCache(cache))
            .map_err(|_| RuntimeError::WorkerGone)
    }

    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.sender.send(ControlMessage::Stop);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for ResolverHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Starts a thread that answers range requests from `cache`, falling back to
/// `source` for uncovered days.
pub fn spawn_resolver_worker<R>(cache: Arc<DailySeries>, source: R) -> ResolverHandle
where
    R: RangeSource + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::unbounded();
    let join = thread::spawn(move || run_worker(cache, source, rx));
    ResolverHandle {
        sender: tx,
        join: Some(join),
    }
}

fn run_worker<R: RangeSource>(
    mut cache: Arc<DailySeries>,
    source: R,
    control_rx: Receiver<ControlMessage>,
) {
    info!(
        first = %cache.first_date(),
        last = %cache.last_date(),
        "resolver worker started"
    );
    loop {
        match control_rx.recv() {
            Ok(ControlMessage::Resolve { start, end, reply }) => {
                let snapshot = Arc::clone(&cache);
                let result = FragmentedRangeResolver::new(&snapshot, &source).resolve(start, end);
                let _ = reply.send(result);
            }
            Ok(ControlMessage::ReplaceCache(next)) => {
                debug!(
                    first = %next.first_date(),
                    last = %next.last_date(),
                    "cache snapshot replaced"
                );
                cache = next;
            }
            Ok(ControlMessage::Stop) | Err(_) => break,
        }
    }
    debug!("resolver worker stopped");
}
