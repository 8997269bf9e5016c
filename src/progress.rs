/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines progress reporting messages, sinks, and helper functions for long-running processes.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Progress reporting primitives for long-running computations.

use std::fmt::Debug;
use std::sync::{mpsc, Arc};
use std::thread;

/// Progress events emitted during field reconstruction.
#[derive(Debug, Clone)]
pub enum ProgressMsg {
    /// Event indicating that boundary anchors were synthesized around the
    /// real samples.
    AnchorsAdded {
        num_edge: usize,
        num_face: usize,
        num_corner: usize,
    },

    /// Event indicating grid evaluation progress.
    EvaluationProgress { evaluated: usize, total: usize },

    /// Arbitrary informational message.
    Message { message: String },
}

/// Sink that consumes progress messages.
pub trait ProgressSink: Send + Sync + Debug {
    fn emit(&self, msg: ProgressMsg);
}

/// Progress sink that forwards messages over a channel.
#[derive(Debug)]
pub struct ClosureSink {
    tx: mpsc::SyncSender<ProgressMsg>,
}

impl ProgressSink for ClosureSink {
    #[inline]
    fn emit(&self, msg: ProgressMsg) {
        let _ = self.tx.try_send(msg);
    }
}

/// Spawns a listener thread that runs a handler closure for each progress message.
pub fn closure_sink<F>(
    buffer: usize,
    mut handler: F,
) -> (Arc<dyn ProgressSink>, thread::JoinHandle<()>)
where
    F: FnMut(ProgressMsg) + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel::<ProgressMsg>(buffer.max(1));
    let sink: Arc<dyn ProgressSink> = Arc::new(ClosureSink { tx });

    let handle = thread::spawn(move || {
        while let Ok(msg) = rx.recv() {
            handler(msg);
        }
    });

    (sink, handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_sink_delivers_messages() {
        let (counter_tx, counter_rx) = mpsc::channel();

        let (sink, handle) = closure_sink(16, move |msg| {
            if let ProgressMsg::EvaluationProgress { evaluated, .. } = msg {
                let _ = counter_tx.send(evaluated);
            }
        });

        sink.emit(ProgressMsg::EvaluationProgress {
            evaluated: 512,
            total: 8000,
        });

        let received = counter_rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .unwrap();
        assert_eq!(received, 512);

        drop(sink);
        handle.join().unwrap();
    }
}
