//! # Outbound Command Queue
//!
//! The camera only receives data while it is being polled, so outgoing bytes are held in a small
//! circular queue and written one at a time in place of the filler byte of each word read. See
//! [`crate::transport`].
//!
//! The queue is the one piece of state shared between threads: commands can be sent through a
//! [`CommandSender`] from any thread while the camera is being polled on another.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{Arc, Mutex, MutexGuard};

use crate::cmd;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Default capacity of the queue in bytes.
pub const OUT_QUEUE_CAPACITY: usize = 64;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Bounded circular queue of bytes waiting to be sent to the camera.
pub struct OutQueue {
    ring: Mutex<Ring>,
}

/// Cloneable handle used to send commands to the camera from any thread.
#[derive(Clone)]
pub struct CommandSender {
    queue: Arc<OutQueue>,
}

struct Ring {
    buf: Vec<u8>,
    read_idx: usize,
    write_idx: usize,
    len: usize,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur when queueing bytes for the camera.
#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Outbound queue full: {requested} bytes requested but only {available} available")]
    Full { requested: usize, available: usize },

    #[error("Cannot queue an empty payload")]
    Empty,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl OutQueue {
    /// Create a queue with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(OUT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ring: Mutex::new(Ring {
                buf: vec![0; capacity],
                read_idx: 0,
                write_idx: 0,
                len: 0,
            }),
        }
    }

    /// Append `data` to the queue.
    ///
    /// Either all of `data` is queued or none of it is. If there is not enough space the queue is
    /// left untouched and [`QueueError::Full`] is returned.
    pub fn enqueue(&self, data: &[u8]) -> Result<(), QueueError> {
        if data.is_empty() {
            return Err(QueueError::Empty);
        }

        let mut ring = self.lock();
        let capacity = ring.buf.len();

        if ring.len + data.len() > capacity {
            return Err(QueueError::Full {
                requested: data.len(),
                available: capacity - ring.len,
            });
        }

        for &b in data {
            let idx = ring.write_idx;
            ring.buf[idx] = b;
            ring.write_idx = (idx + 1) % capacity;
        }
        ring.len += data.len();

        Ok(())
    }

    /// Take the next byte to be sent, if any.
    ///
    /// Only the transport should call this, once per word read.
    pub fn next_outbound_byte(&self) -> Option<u8> {
        let mut ring = self.lock();

        if ring.len == 0 {
            return None;
        }

        let idx = ring.read_idx;
        let b = ring.buf[idx];
        ring.read_idx = (idx + 1) % ring.buf.len();
        ring.len -= 1;

        Some(b)
    }

    /// Number of bytes waiting to be sent.
    /// The byte [`next_outbound_byte`](Self::next_outbound_byte) would return, left in the queue.
    pub fn peek_outbound_byte(&self) -> Option<u8> {
        let ring = self.lock();

        if ring.len == 0 {
            None
        } else {
            Some(ring.buf[ring.read_idx])
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock().buf.len()
    }

    fn lock(&self) -> MutexGuard<'_, Ring> {
        // Every update to the ring is completed before the guard is released, so a poisoned lock
        // still holds a consistent ring.
        self.ring.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for OutQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandSender {
    pub(crate) fn new(queue: Arc<OutQueue>) -> Self {
        Self { queue }
    }

    /// Queue raw bytes for the camera.
    pub fn send(&self, data: &[u8]) -> Result<(), QueueError> {
        self.queue.enqueue(data)
    }

    /// Set the camera brightness (exposure), 0 to 255.
    pub fn set_brightness(&self, brightness: u8) -> Result<(), QueueError> {
        self.send(&cmd::brightness(brightness))
    }

    /// Set the RGB LED on the front of the camera.
    pub fn set_led(&self, red: bool, green: bool, blue: bool) -> Result<(), QueueError> {
        self.send(&cmd::led(red, green, blue))
    }

    /// Number of bytes still waiting to be clocked out.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;

    fn cursors(queue: &OutQueue) -> (usize, usize, usize) {
        let ring = queue.lock();
        (ring.read_idx, ring.write_idx, ring.len)
    }

    fn drain(queue: &OutQueue) -> Vec<u8> {
        std::iter::from_fn(|| queue.next_outbound_byte()).collect()
    }

    #[test]
    fn test_fifo_order() {
        let queue = OutQueue::new();
        queue.enqueue(&[1, 2, 3]).unwrap();
        queue.enqueue(&[4]).unwrap();

        assert_eq!(queue.len(), 4);
        assert_eq!(drain(&queue), vec![1, 2, 3, 4]);
        assert!(queue.is_empty());
        assert_eq!(queue.next_outbound_byte(), None);
    }

    #[test]
    fn test_peek_leaves_byte_queued() {
        let queue = OutQueue::with_capacity(4);
        assert_eq!(queue.peek_outbound_byte(), None);

        queue.enqueue(&[7, 8]).unwrap();
        assert_eq!(queue.peek_outbound_byte(), Some(7));
        assert_eq!(queue.peek_outbound_byte(), Some(7));
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.next_outbound_byte(), Some(7));
        assert_eq!(queue.peek_outbound_byte(), Some(8));
    }

    #[test]
    fn test_overflow_is_rejected_whole() {
        let queue = OutQueue::with_capacity(8);
        queue.enqueue(&[1, 2, 3, 4, 5]).unwrap();
        let before = cursors(&queue);

        assert_eq!(
            queue.enqueue(&[6, 7, 8, 9]),
            Err(QueueError::Full {
                requested: 4,
                available: 3
            })
        );

        // Nothing moved
        assert_eq!(cursors(&queue), before);
        assert_eq!(drain(&queue), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_exact_fit_and_empty_payload() {
        let queue = OutQueue::with_capacity(4);
        assert_eq!(queue.enqueue(&[]), Err(QueueError::Empty));
        queue.enqueue(&[1, 2, 3, 4]).unwrap();
        assert_eq!(queue.len(), queue.capacity());
        assert!(queue.enqueue(&[5]).is_err());
    }

    #[test]
    fn test_cursors_wrap() {
        let queue = OutQueue::with_capacity(4);

        queue.enqueue(&[1, 2, 3]).unwrap();
        assert_eq!(drain(&queue), vec![1, 2, 3]);

        // This write wraps around the end of the buffer
        queue.enqueue(&[4, 5, 6]).unwrap();
        assert_eq!(cursors(&queue), (3, 2, 3));
        assert_eq!(drain(&queue), vec![4, 5, 6]);
    }

    #[test]
    fn test_concurrent_senders() {
        let queue = Arc::new(OutQueue::with_capacity(OUT_QUEUE_CAPACITY));
        let sender = CommandSender::new(queue.clone());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let sender = sender.clone();
                thread::spawn(move || sender.send(&[i; 5]))
            })
            .collect();

        for h in handles {
            h.join().unwrap().unwrap();
        }

        // Each command must come out contiguously regardless of which thread won the lock
        let bytes = drain(&queue);
        assert_eq!(bytes.len(), 20);
        for chunk in bytes.chunks(5) {
            assert!(chunk.iter().all(|b| *b == chunk[0]));
        }
    }
}
