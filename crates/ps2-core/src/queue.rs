//! Fixed-capacity byte FIFO between the decoder and host reads.

use crate::QueueError;

/// Number of decoded bytes the queue holds.
pub const BYTE_QUEUE_CAPACITY: usize = 4;

/// Ring-buffer registers of the byte queue plus its registered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ByteQueue {
    slots: [u8; BYTE_QUEUE_CAPACITY],
    head: u8,
    tail: u8,
    count: u8,
    output: u8,
}

/// Result of one queue tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStep {
    /// Registers to commit at the end of the tick.
    pub next: ByteQueue,
    /// Write request outcome, when a byte was offered.
    pub write: Option<Result<(), QueueError>>,
    /// Read request outcome, when a dequeue was triggered.
    pub read: Option<Result<u8, QueueError>>,
}

impl ByteQueue {
    /// Returns true when no bytes are queued.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true when every slot is occupied.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.count as usize == BYTE_QUEUE_CAPACITY
    }

    /// Returns the number of queued bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count as usize
    }

    /// Returns the output register presented on the host data bus.
    #[must_use]
    pub const fn output(&self) -> u8 {
        self.output
    }

    /// Returns the queued bytes in dequeue order.
    pub fn pending(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.len()).map(move |offset| {
            self.slots[(usize::from(self.head) + offset) % BYTE_QUEUE_CAPACITY]
        })
    }

    /// Appends a byte at the tail.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Overflow`] and leaves the queue unchanged when it
    /// is full.
    #[allow(clippy::cast_possible_truncation)]
    pub fn enqueue(&mut self, byte: u8) -> Result<(), QueueError> {
        if self.is_full() {
            return Err(QueueError::Overflow { dropped: byte });
        }
        self.slots[usize::from(self.tail)] = byte;
        self.tail = ((usize::from(self.tail) + 1) % BYTE_QUEUE_CAPACITY) as u8;
        self.count += 1;
        Ok(())
    }

    /// Removes the head byte and latches it into the output register.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Underflow`] and leaves the output register
    /// unchanged when the queue is empty.
    #[allow(clippy::cast_possible_truncation)]
    pub fn dequeue(&mut self) -> Result<u8, QueueError> {
        if self.is_empty() {
            return Err(QueueError::Underflow);
        }
        let byte = self.slots[usize::from(self.head)];
        self.head = ((usize::from(self.head) + 1) % BYTE_QUEUE_CAPACITY) as u8;
        self.count -= 1;
        self.output = byte;
        Ok(byte)
    }

    /// Computes the registers after one tick.
    ///
    /// Both requests are gated on the occupancy at the start of the tick, so a
    /// simultaneous write and read against a full queue still drops the byte,
    /// and against an empty queue the read is still an underflow.
    #[must_use]
    pub fn step(&self, write: Option<u8>, read: bool) -> QueueStep {
        let mut next = *self;

        let read = read.then(|| {
            if self.is_empty() {
                Err(QueueError::Underflow)
            } else {
                next.dequeue()
            }
        });
        let write = write.map(|byte| {
            if self.is_full() {
                Err(QueueError::Overflow { dropped: byte })
            } else {
                next.enqueue(byte)
            }
        });

        QueueStep { next, write, read }
    }
}

#[cfg(test)]
mod tests {
    use super::{ByteQueue, BYTE_QUEUE_CAPACITY};
    use crate::QueueError;

    fn filled(bytes: &[u8]) -> ByteQueue {
        let mut queue = ByteQueue::default();
        for &byte in bytes {
            queue.enqueue(byte).expect("queue has room");
        }
        queue
    }

    #[test]
    fn fifo_order_is_preserved() {
        let mut queue = filled(&[0xA0, 0xA1, 0xA2]);
        assert_eq!(queue.dequeue(), Ok(0xA0));
        assert_eq!(queue.dequeue(), Ok(0xA1));
        assert_eq!(queue.dequeue(), Ok(0xA2));
        assert_eq!(queue.output(), 0xA2);
        assert!(queue.is_empty());
    }

    #[test]
    fn fifth_byte_is_dropped_when_full() {
        let mut queue = filled(&[1, 2, 3, 4]);
        assert!(queue.is_full());
        assert_eq!(queue.enqueue(5), Err(QueueError::Overflow { dropped: 5 }));
        assert_eq!(queue.len(), BYTE_QUEUE_CAPACITY);
        assert_eq!(queue.pending().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn underflow_keeps_output_register() {
        let mut queue = filled(&[0x7E]);
        assert_eq!(queue.dequeue(), Ok(0x7E));
        assert_eq!(queue.dequeue(), Err(QueueError::Underflow));
        assert_eq!(queue.output(), 0x7E);
    }

    #[test]
    fn ring_wraps_past_capacity() {
        let mut queue = ByteQueue::default();
        for round in 0..10u8 {
            queue.enqueue(round).expect("room");
            assert_eq!(queue.dequeue(), Ok(round));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn simultaneous_write_and_read_keep_count() {
        let queue = filled(&[1, 2]);
        let step = queue.step(Some(3), true);
        assert_eq!(step.read, Some(Ok(1)));
        assert_eq!(step.write, Some(Ok(())));
        assert_eq!(step.next.len(), 2);
        assert_eq!(step.next.pending().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn simultaneous_write_and_read_on_full_queue_drops_write() {
        let queue = filled(&[1, 2, 3, 4]);
        let step = queue.step(Some(9), true);
        assert_eq!(step.read, Some(Ok(1)));
        assert_eq!(step.write, Some(Err(QueueError::Overflow { dropped: 9 })));
        assert_eq!(step.next.pending().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn simultaneous_write_and_read_on_empty_queue_only_writes() {
        let queue = ByteQueue::default();
        let step = queue.step(Some(0x42), true);
        assert_eq!(step.read, Some(Err(QueueError::Underflow)));
        assert_eq!(step.next.len(), 1);
        assert_eq!(step.next.output(), 0);
    }

    #[test]
    fn idle_step_changes_nothing() {
        let queue = filled(&[5, 6]);
        let step = queue.step(None, false);
        assert_eq!(step.next, queue);
        assert!(step.write.is_none());
        assert!(step.read.is_none());
    }
}
