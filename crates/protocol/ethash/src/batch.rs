//! Concurrent verification of header batches.

use crate::{ChainReader, Ethash, EthashError};
use alloy_consensus::Header;
use std::{
    num::NonZeroUsize,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
    thread::available_parallelism,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// The outcome of one header of a batch.
pub type VerificationResult = Result<(), EthashError>;

impl Ethash {
    /// Verifies a batch of headers concurrently.
    ///
    /// Returns a token that aborts the batch, and a channel yielding one result per header in
    /// input order. `seals[i]` selects whether the seal of `headers[i]` is checked; missing
    /// entries default to checked. The first header's parent is looked up in `chain`, every
    /// later header must extend the previous one.
    ///
    /// Must be called from within a tokio runtime. Headers are verified on blocking worker
    /// threads, at most one per available core. A header whose verification panics is reported
    /// as [`EthashError::VerificationPanicked`] and the batch carries on.
    pub fn verify_headers<C>(
        &self,
        chain: C,
        headers: Vec<Header>,
        seals: Vec<bool>,
    ) -> (CancellationToken, mpsc::Receiver<VerificationResult>)
    where
        C: ChainReader + Send + Sync + 'static,
    {
        let cancel = CancellationToken::new();
        let (results_tx, results_rx) = mpsc::channel(headers.len().max(1));

        if self.config.mode.is_fully_permissive() || headers.is_empty() {
            // The channel holds one slot per header and the receiver is still alive.
            for _ in 0..headers.len() {
                let sent = results_tx.try_send(Ok(()));
                debug_assert!(sent.is_ok(), "result channel sized to the batch");
            }
            return (cancel, results_rx);
        }

        let total = headers.len();
        let workers = available_parallelism().map_or(1, NonZeroUsize::get).min(total);
        debug!(target: "ethash::batch", total, workers, "Verifying header batch");

        let batch = Arc::new(Batch { engine: self.clone(), chain, headers, seals });
        let (inputs_tx, inputs_rx) = async_channel::bounded::<usize>(1);
        let (done_tx, mut done_rx) = mpsc::channel::<(usize, VerificationResult)>(total);

        for _ in 0..workers {
            let batch = Arc::clone(&batch);
            let inputs = inputs_rx.clone();
            let done = done_tx.clone();
            tokio::task::spawn_blocking(move || {
                while let Ok(index) = inputs.recv_blocking() {
                    let result = catch_unwind(AssertUnwindSafe(|| batch.verify(index)))
                        .unwrap_or_else(|_| {
                            warn!(target: "ethash::batch", index, "Header verification panicked");
                            Err(EthashError::VerificationPanicked)
                        });
                    if done.blocking_send((index, result)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(inputs_rx);
        drop(done_tx);

        let abort = cancel.clone();
        tokio::spawn(async move {
            crate::set!(gauge, BATCH_WORKERS, workers as f64);
            let mut checked: Vec<Option<VerificationResult>> = (0..total).map(|_| None).collect();
            let (mut next, mut out) = (0, 0);

            'batch: while out < total {
                tokio::select! {
                    _ = abort.cancelled() => {
                        debug!(target: "ethash::batch", delivered = out, total, "Header batch aborted");
                        break;
                    }
                    sent = inputs_tx.send(next), if next < total => {
                        if sent.is_err() {
                            warn!(target: "ethash::batch", "Batch workers exited early");
                            break;
                        }
                        next += 1;
                    }
                    done = done_rx.recv() => {
                        let Some((index, result)) = done else {
                            warn!(target: "ethash::batch", delivered = out, total, "Batch workers exited early");
                            break;
                        };
                        checked[index] = Some(result);
                        while let Some(result) = checked.get_mut(out).and_then(Option::take) {
                            if results_tx.send(result).await.is_err() {
                                trace!(target: "ethash::batch", "Result receiver dropped");
                                break 'batch;
                            }
                            out += 1;
                        }
                    }
                }
            }
            // Dropping the input sender stops the workers.
            drop(inputs_tx);
            crate::set!(gauge, BATCH_WORKERS, 0.0);
            trace!(target: "ethash::batch", delivered = out, total, "Header batch finished");
        });

        (cancel, results_rx)
    }
}

/// Shared state of one batch, handed to every worker.
struct Batch<C> {
    engine: Ethash,
    chain: C,
    headers: Vec<Header>,
    seals: Vec<bool>,
}

impl<C: ChainReader> Batch<C> {
    /// Verifies the header at `index`, taking its parent from the batch when it directly
    /// extends the previous header.
    fn verify(&self, index: usize) -> VerificationResult {
        let header = &self.headers[index];

        let parent = match index.checked_sub(1) {
            None => header
                .number
                .checked_sub(1)
                .and_then(|number| self.chain.header(header.parent_hash, number)),
            Some(prev) => Some(&self.headers[prev])
                .filter(|prev| prev.hash_slow() == header.parent_hash)
                .cloned(),
        };
        let Some(parent) = parent else { return Err(EthashError::UnknownAncestor) };

        if self.chain.header(header.hash_slow(), header.number).is_some() {
            return Ok(());
        }

        let seal = self.seals.get(index).copied().unwrap_or(true);
        self.engine.verify_header_with_parent(self.chain.config(), header, &parent, false, seal)
    }
}
