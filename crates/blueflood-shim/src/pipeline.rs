// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use observations::Observation;
use tracing::debug;

use crate::buffer::BatchBuffer;
use crate::errors::ShimError;
use crate::flattener::Flattener;
use crate::forwarder::Forwarder;
use crate::worker_pool::{Line, LineProcessor};

/// Parse, flatten and buffer; one instance per worker.
pub struct Pipeline<F> {
    flattener: Flattener,
    buffer: BatchBuffer<F>,
    flush_on_shutdown: bool,
    lines_processed: u64,
}

impl<F: Forwarder> Pipeline<F> {
    pub fn new(flattener: Flattener, buffer: BatchBuffer<F>) -> Self {
        Self {
            flattener,
            buffer,
            flush_on_shutdown: true,
            lines_processed: 0,
        }
    }

    /// Whether [`LineProcessor::finish`] ships the points still buffered.
    #[must_use]
    pub fn flush_on_shutdown(mut self, enabled: bool) -> Self {
        self.flush_on_shutdown = enabled;
        self
    }

    pub async fn process_line(&mut self, line: &Line) -> Result<(), ShimError> {
        let obs = Observation::from_json(&line.text).map_err(|source| ShimError::InputParse {
            line: line.number,
            source,
        })?;
        let points = self.flattener.flatten(&obs);
        self.buffer.enqueue_all(points).await?;
        self.lines_processed += 1;
        Ok(())
    }

    pub fn buffer(&self) -> &BatchBuffer<F> {
        &self.buffer
    }

    pub fn lines_processed(&self) -> u64 {
        self.lines_processed
    }
}

#[async_trait]
impl<F: Forwarder + 'static> LineProcessor for Pipeline<F> {
    async fn process(&mut self, line: Line) -> Result<(), ShimError> {
        self.process_line(&line).await
    }

    async fn finish(&mut self) -> Result<(), ShimError> {
        if self.flush_on_shutdown {
            debug!(
                "Flushing {} remaining points after {} lines",
                self.buffer.len(),
                self.lines_processed
            );
            self.buffer.flush().await?;
        } else if !self.buffer.is_empty() {
            debug!(
                "Discarding {} buffered points at shutdown",
                self.buffer.len()
            );
        }
        Ok(())
    }
}
