//! ParserPool - fetch+decode jobs on rayon's fixed worker pool.
//!
//! Jobs are fire-and-forget `rayon::spawn` closures; completions come back
//! over an unbounded channel the polling thread drains. A failing job fails
//! only its own completion; workers are recycled for subsequent jobs.

use crossbeam_channel::{self as channel, Receiver, Sender};
use web_time::Instant;

use crate::error::StreamError;
use crate::sector::SectorId;

use super::SectorGeometry;

/// Completed fetch+decode job.
pub struct ParseCompletion {
  /// Streaming generation the job was submitted under; stale completions
  /// are discarded by the consumer.
  pub generation: u64,
  pub sector: SectorId,
  pub result: Result<SectorGeometry, StreamError>,
  /// Wall time of fetch plus decode in microseconds.
  pub elapsed_us: u64,
}

/// Dispatches parse jobs to the next free rayon worker, queueing when all
/// are busy.
pub struct ParserPool {
  sender: Sender<ParseCompletion>,
  receiver: Receiver<ParseCompletion>,
  in_flight: usize,
}

impl ParserPool {
  pub fn new() -> Self {
    let (sender, receiver) = channel::unbounded();
    Self {
      sender,
      receiver,
      in_flight: 0,
    }
  }

  /// Submit one job (non-blocking).
  pub fn submit<F>(&mut self, generation: u64, sector: SectorId, job: F)
  where
    F: FnOnce() -> Result<SectorGeometry, StreamError> + Send + 'static,
  {
    let sender = self.sender.clone();
    self.in_flight += 1;

    rayon::spawn(move || {
      let start = Instant::now();
      let result = job();
      // Ignore send error (pool dropped = consumer gone).
      let _ = sender.send(ParseCompletion {
        generation,
        sector,
        result,
        elapsed_us: start.elapsed().as_micros() as u64,
      });
    });
  }

  /// Take all completions that have arrived (non-blocking).
  pub fn drain_completions(&mut self) -> Vec<ParseCompletion> {
    let completions: Vec<_> = self.receiver.try_iter().collect();
    self.in_flight -= completions.len();
    completions
  }

  /// Jobs submitted but not yet drained.
  pub fn in_flight(&self) -> usize {
    self.in_flight
  }

  pub fn is_idle(&self) -> bool {
    self.in_flight == 0
  }

  /// Number of workers in the underlying pool.
  pub fn worker_count(&self) -> usize {
    rayon::current_num_threads()
  }
}

impl Default for ParserPool {
  fn default() -> Self {
    Self::new()
  }
}
