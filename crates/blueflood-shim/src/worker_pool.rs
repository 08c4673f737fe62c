// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Round-robin distribution of input lines across a fixed set of workers.
//!
//! The dispatcher reads the input sequentially and hands line `i` to worker
//! `i % workers`. Every worker owns its own [`LineProcessor`], an inbound
//! channel with room for a single line and a termination token. Once the input
//! is exhausted the dispatcher cancels every token; a worker that observes
//! cancellation first drains whatever is already queued for it, then finishes
//! its processor and reports back through the pool's [`JoinSet`].
//!
//! No worker finishes until every worker has drained. If any of them failed,
//! the others skip [`LineProcessor::finish`], so a fatal error never lets the
//! rest of the pool ship partial buffers.
//!
//! ```text
//!              ┌──────────┐  line 0, k, 2k ...   ┌──────────┐
//!   input ───> │dispatcher│ ───────────────────> │ worker 0 │
//!              └──────────┘  line 1, k+1 ...     ├──────────┤
//!                    │     ───────────────────>  │ worker 1 │
//!                    │                           ├──────────┤
//!                    └───────── cancel ────────> │   ...    │
//!                                                └──────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc, Barrier};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::errors::ShimError;

/// One line of input together with its 1-based position in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: u64,
    pub text: String,
}

/// Per-worker handling of dispatched lines.
#[async_trait]
pub trait LineProcessor: Send + 'static {
    async fn process(&mut self, line: Line) -> Result<(), ShimError>;

    /// Called once after the worker has drained its last line.
    async fn finish(&mut self) -> Result<(), ShimError>;
}

/// Summary of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub workers: usize,
    pub lines_dispatched: u64,
}

pub struct WorkerPool<P> {
    processors: Vec<P>,
}

impl<P: LineProcessor> WorkerPool<P> {
    /// Creates a pool with one worker per processor.
    pub fn new(processors: Vec<P>) -> Self {
        Self { processors }
    }

    pub fn workers(&self) -> usize {
        self.processors.len()
    }

    /// Dispatches every line of `input` and waits for all workers to finish.
    ///
    /// The first error from either the input or a worker is returned; any
    /// workers still running at that point are aborted.
    pub async fn run<R>(self, input: R) -> Result<PoolStats, ShimError>
    where
        R: AsyncBufRead + Unpin,
    {
        let workers = self.processors.len();
        if workers == 0 {
            return Ok(PoolStats {
                workers,
                lines_dispatched: 0,
            });
        }

        let shutdown = CancellationToken::new();
        let abort = CancellationToken::new();
        let drained = Arc::new(Barrier::new(workers));
        let mut set = JoinSet::new();
        let mut senders = Vec::with_capacity(workers);

        for (id, processor) in self.processors.into_iter().enumerate() {
            let (tx, rx) = mpsc::channel(1);
            let worker = Worker {
                id,
                fin: shutdown.child_token(),
                abort: abort.clone(),
                drained: Arc::clone(&drained),
            };
            set.spawn(worker.run(processor, rx));
            senders.push(tx);
        }

        let dispatched = dispatch(input, &senders, &abort).await;
        if dispatched.is_err() {
            abort.cancel();
        }
        shutdown.cancel();
        drop(senders);

        let lines_dispatched = match dispatched {
            Ok(n) => n,
            Err(e) => {
                set.abort_all();
                wait_all(&mut set).await;
                return Err(e);
            }
        };

        while let Some(joined) = set.join_next().await {
            let result = match joined {
                Ok((_, result)) => result,
                Err(e) if e.is_cancelled() => continue,
                Err(e) => Err(ShimError::Worker(e.to_string())),
            };
            if let Err(e) = result {
                error!("Worker failed: {e}");
                set.abort_all();
                wait_all(&mut set).await;
                return Err(e);
            }
        }

        debug!("All {workers} workers finished after {lines_dispatched} lines");
        Ok(PoolStats {
            workers,
            lines_dispatched,
        })
    }
}

/// Sends line `i` to worker `i % senders.len()`. Stops early once any worker
/// has failed.
async fn dispatch<R>(
    input: R,
    senders: &[mpsc::Sender<Line>],
    abort: &CancellationToken,
) -> Result<u64, ShimError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut index: usize = 0;
    while let Some(text) = lines.next_line().await? {
        if abort.is_cancelled() {
            debug!("A worker failed, halting dispatch at line {}", index + 1);
            break;
        }
        let line = Line {
            number: index as u64 + 1,
            text,
        };
        let target = index % senders.len();
        if senders[target].send(line).await.is_err() {
            debug!("Worker {target} stopped accepting lines, halting dispatch");
            break;
        }
        index += 1;
    }
    Ok(index as u64)
}

struct Worker {
    id: usize,
    /// Input is exhausted; drain and stop.
    fin: CancellationToken,
    /// Some worker failed; stop without finishing.
    abort: CancellationToken,
    /// Every worker waits here once before finishing.
    drained: Arc<Barrier>,
}

impl Worker {
    async fn run<P: LineProcessor>(
        self,
        mut processor: P,
        rx: mpsc::Receiver<Line>,
    ) -> (usize, Result<(), ShimError>) {
        debug!("Worker {} started", self.id);
        let processed = self.drain(&mut processor, rx).await;
        if processed.is_err() {
            self.abort.cancel();
        }

        self.drained.wait().await;

        let result = match processed {
            Err(e) => Err(e),
            Ok(()) if self.abort.is_cancelled() => {
                debug!("Worker {} skipping finish after a failure elsewhere", self.id);
                Ok(())
            }
            Ok(()) => processor.finish().await,
        };
        debug!("Worker {} terminating", self.id);
        (self.id, result)
    }

    /// Processes lines until termination, then everything already queued. The
    /// receiver is dropped on return so a blocked dispatcher sees the closed
    /// channel.
    async fn drain<P: LineProcessor>(
        &self,
        processor: &mut P,
        mut rx: mpsc::Receiver<Line>,
    ) -> Result<(), ShimError> {
        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Some(line) => processor.process(line).await?,
                    None => break,
                },
                _ = self.fin.cancelled() => break,
                _ = self.abort.cancelled() => return Ok(()),
            }
        }

        // Termination may win the race against lines already handed over
        rx.close();
        while let Some(line) = rx.recv().await {
            if self.abort.is_cancelled() {
                break;
            }
            processor.process(line).await?;
        }
        Ok(())
    }
}

async fn wait_all<T: 'static>(set: &mut JoinSet<T>) {
    while set.join_next().await.is_some() {}
}
