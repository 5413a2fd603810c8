//! Pad triggers from the control thread.
//!
//! A bounded single-producer, single-consumer ring. The engine drains it at
//! the start of every block, replaying only the entries that were queued
//! when the drain began. Anything pushed while the drain is running waits
//! for the next block.

use rtrb::{Consumer, Producer, RingBuffer};

use crate::NUM_PARTS;

pub const TRIGGER_QUEUE_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerRequest {
    pub part: usize,
    pub velocity: f32,
}

/// Control-side end of the queue.
pub struct TriggerSender {
    producer: Producer<TriggerRequest>,
}

/// Audio-side end of the queue.
pub struct TriggerReceiver {
    consumer: Consumer<TriggerRequest>,
}

pub fn trigger_queue() -> (TriggerSender, TriggerReceiver) {
    let (producer, consumer) = RingBuffer::new(TRIGGER_QUEUE_CAPACITY);
    (TriggerSender { producer }, TriggerReceiver { consumer })
}

impl TriggerSender {
    /// Queue a trigger. Returns false when the part is out of range or the
    /// queue is full; the request is dropped in both cases.
    pub fn enqueue(&mut self, part: usize, velocity: f32) -> bool {
        if part >= NUM_PARTS {
            return false;
        }
        self.producer.push(TriggerRequest { part, velocity }).is_ok()
    }

    /// Free slots left.
    pub fn available(&self) -> usize {
        self.producer.slots()
    }
}

impl TriggerReceiver {
    /// Hand every request present right now to `f`, in arrival order.
    /// Returns how many were replayed.
    pub fn drain(&mut self, mut f: impl FnMut(TriggerRequest)) -> usize {
        let pending = self.consumer.slots();
        let mut replayed = 0;
        for _ in 0..pending {
            match self.consumer.pop() {
                Ok(request) => {
                    f(request);
                    replayed += 1;
                }
                Err(_) => break,
            }
        }
        replayed
    }

    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }
}
