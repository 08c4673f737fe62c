// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-worker batching of metric points.
//!
//! A [`BatchBuffer`] is owned by exactly one worker and is never shared, so it
//! needs no locking. Points accumulate in arrival order until the queue grows
//! past the threshold, at which point the whole queue ships as one batch.

use tracing::debug;

use crate::constants::DEFAULT_FLUSH_THRESHOLD;
use crate::errors::ForwardError;
use crate::forwarder::Forwarder;
use crate::metric::MetricPoint;

pub struct BatchBuffer<F> {
    queue: Vec<MetricPoint>,
    forwarder: F,
    threshold: usize,
    send_empty_batches: bool,
    batches_sent: u64,
}

impl<F: Forwarder> BatchBuffer<F> {
    pub fn new(forwarder: F) -> Self {
        Self::with_threshold(forwarder, DEFAULT_FLUSH_THRESHOLD)
    }

    pub fn with_threshold(forwarder: F, threshold: usize) -> Self {
        Self {
            queue: Vec::new(),
            forwarder,
            threshold,
            send_empty_batches: false,
            batches_sent: 0,
        }
    }

    /// Makes [`BatchBuffer::flush`] post an empty array when nothing is queued.
    #[must_use]
    pub fn send_empty_batches(mut self, enabled: bool) -> Self {
        self.send_empty_batches = enabled;
        self
    }

    /// Appends `point`, flushing when the queue holds more than the threshold.
    pub async fn enqueue(&mut self, point: MetricPoint) -> Result<(), ForwardError> {
        self.queue.push(point);
        if self.queue.len() > self.threshold {
            self.flush().await?;
        }
        Ok(())
    }

    pub async fn enqueue_all<I>(&mut self, points: I) -> Result<(), ForwardError>
    where
        I: IntoIterator<Item = MetricPoint>,
    {
        for point in points {
            self.enqueue(point).await?;
        }
        Ok(())
    }

    /// Ships everything queued as one batch.
    ///
    /// The queue is emptied only once the forwarder succeeds. On failure the
    /// points stay queued and the error is returned to the caller.
    pub async fn flush(&mut self) -> Result<(), ForwardError> {
        if self.queue.is_empty() && !self.send_empty_batches {
            return Ok(());
        }

        debug!("Flushing batch of {} points", self.queue.len());
        self.forwarder.send(&self.queue).await?;
        self.queue.clear();
        self.batches_sent += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Number of batches the forwarder has acknowledged.
    pub fn batches_sent(&self) -> u64 {
        self.batches_sent
    }

    pub fn forwarder(&self) -> &F {
        &self.forwarder
    }
}
