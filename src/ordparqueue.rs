//! A small fixed worker pool whose results come back in submission order,
//! no matter in which order the jobs happen to finish.

use crate::error::{CatResult, Error};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::thread;

type Job<T> = Box<dyn FnOnce() -> T + Send>;

pub(crate) struct OrdParQueue<T> {
    jobs: Sender<(usize, Job<T>)>,
    current_index: usize,
}

pub(crate) struct OrdParQueueIter<T> {
    receiver: Receiver<ReverseTuple<T>>,
    next_index: usize,
    receive_buffer: BinaryHeap<ReverseTuple<T>>,
}

/// Workers exit once the `OrdParQueue` is dropped and the job channel drains,
/// or as soon as the iterator side goes away.
pub(crate) fn new<T: Send + 'static>(num_workers: usize) -> CatResult<(OrdParQueue<T>, OrdParQueueIter<T>)> {
    let (jobs, jobs_receiver) = unbounded::<(usize, Job<T>)>();
    let (results, results_receiver) = bounded(num_workers);
    for n in 0..num_workers {
        let jobs_receiver = jobs_receiver.clone();
        let results = results.clone();
        thread::Builder::new().name(format!("enc{}", n)).spawn(move || {
            while let Ok((index, job)) = jobs_receiver.recv() {
                if results.send(ReverseTuple(index, job())).is_err() {
                    break; // receiver gone, no one cares about the rest
                }
            }
        })?;
    }
    Ok((OrdParQueue {
        jobs,
        current_index: 0,
    }, OrdParQueueIter {
        receiver: results_receiver,
        next_index: 0,
        receive_buffer: BinaryHeap::new(),
    }))
}

impl<T: Send + 'static> OrdParQueue<T> {
    pub fn push<F>(&mut self, job: F) -> CatResult<()> where F: FnOnce() -> T + Send + 'static {
        self.jobs.send((self.current_index, Box::new(job))).map_err(|_| Error::ThreadSend)?;
        self.current_index += 1;
        Ok(())
    }
}

impl<T> Iterator for OrdParQueueIter<T> {
    type Item = T;
    fn next(&mut self) -> Option<T> {
        while self.receive_buffer.peek().map(|i| i.0) != Some(self.next_index) {
            match self.receiver.recv() {
                Ok(item) => self.receive_buffer.push(item),
                Err(_) => {
                    // All workers exited (but keep dumping the reorder buffer)
                    break;
                },
            }
        }

        if let Some(item) = self.receive_buffer.pop() {
            self.next_index += 1;
            Some(item.1)
        } else {
            None
        }
    }
}

struct ReverseTuple<T>(usize, T);
impl<T> PartialEq for ReverseTuple<T> {
    fn eq(&self, o: &Self) -> bool { o.0.eq(&self.0) }
}
impl<T> Eq for ReverseTuple<T> {}
impl<T> PartialOrd for ReverseTuple<T> {
    fn partial_cmp(&self, o: &Self) -> Option<Ordering> { o.0.partial_cmp(&self.0) }
}
impl<T> Ord for ReverseTuple<T> {
    fn cmp(&self, o: &Self) -> Ordering { o.0.cmp(&self.0) }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    #[test]
    fn results_come_back_in_submission_order() {
        let (mut queue, iter) = super::new(4).unwrap();
        // Earlier jobs sleep longer, so completion order is roughly reversed
        for i in 0..16_u64 {
            queue.push(move || {
                std::thread::sleep(Duration::from_millis((16 - i) * 3));
                i
            }).unwrap();
        }
        drop(queue);
        let collected: Vec<_> = iter.collect();
        assert_eq!(collected, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn empty_queue_yields_nothing() {
        let (queue, iter) = super::new::<u8>(2).unwrap();
        drop(queue);
        assert_eq!(iter.count(), 0);
    }
}
