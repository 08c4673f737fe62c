// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use tokio::fs::File;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::{debug, info};

use crate::buffer::BatchBuffer;
use crate::config::Config;
use crate::errors::ShimError;
use crate::flattener::Flattener;
use crate::forwarder::BluefloodForwarder;
use crate::pipeline::Pipeline;
use crate::worker_pool::{PoolStats, WorkerPool};

/// Builds one independent pipeline per configured job.
pub fn build_pipelines(config: &Config) -> Result<Vec<Pipeline<BluefloodForwarder>>, ShimError> {
    let flattener = Flattener::new(config.ingestion_ttl);
    (0..config.jobs)
        .map(|_| -> Result<_, ShimError> {
            let forwarder = BluefloodForwarder::new(config.url.clone(), config.request_timeout)?;
            let buffer = BatchBuffer::with_threshold(forwarder, config.flush_threshold)
                .send_empty_batches(config.send_empty_batches);
            Ok(Pipeline::new(flattener, buffer).flush_on_shutdown(config.flush_on_shutdown))
        })
        .collect()
}

/// Relays every line of `input` and returns once all workers are done.
pub async fn relay<R>(config: &Config, input: R) -> Result<PoolStats, ShimError>
where
    R: AsyncBufRead + Unpin,
{
    config.validate()?;
    let pool = WorkerPool::new(build_pipelines(config)?);
    debug!("Starting {} workers against {}", pool.workers(), config.url);
    pool.run(input).await
}

/// Relays the file at `config.dump_path`.
pub async fn run(config: &Config) -> Result<PoolStats, ShimError> {
    let file = File::open(&config.dump_path).await?;
    info!("Relaying {} to {}", config.dump_path.display(), config.url);
    let stats = relay(config, BufReader::new(file)).await?;
    info!(
        "Relayed {} lines with {} workers",
        stats.lines_dispatched, stats.workers
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_build_pipelines_one_per_job() {
        let config = Config {
            jobs: 3,
            ..Default::default()
        };
        let pipelines = build_pipelines(&config).unwrap();
        assert_eq!(pipelines.len(), 3);
        for pipeline in &pipelines {
            assert_eq!(pipeline.buffer().threshold(), config.flush_threshold);
            assert_eq!(pipeline.buffer().forwarder().url(), config.url);
        }
    }

    #[tokio::test]
    async fn test_run_missing_file_is_source_error() {
        let config = Config {
            dump_path: PathBuf::from("/nonexistent/dir/dump.json"),
            ..Default::default()
        };
        let result = run(&config).await;
        assert!(matches!(result, Err(ShimError::SourceIo(_))));
    }

    #[tokio::test]
    async fn test_relay_rejects_invalid_config() {
        let config = Config {
            jobs: 0,
            ..Default::default()
        };
        let result = relay(&config, &b""[..]).await;
        assert!(matches!(result, Err(ShimError::Config(_))));
    }
}
