//! Channel contracts between the interrupt handler and task context.
//!
//! The interrupt side and the task side get separate traits so a call site
//! can never pick the wrong flavour. Every operation is non-blocking.
//! `heapless::spsc` queues, whole or split into halves, implement all of
//! them.

use heapless::spsc::{Consumer, Producer, Queue};

use crate::error::{QueueError, Result};

/// Receiving end read from interrupt context.
pub trait IsrReceiver<T> {
    /// Take the oldest element, if any.
    fn try_read_isr(&mut self) -> Option<T>;

    /// True if an element is waiting.
    fn has_message_isr(&self) -> bool;
}

/// Sending end written from interrupt context.
pub trait IsrSender<T> {
    /// Enqueue without blocking, handing the element back when full.
    fn try_write_isr(&mut self, item: T) -> core::result::Result<(), T>;
}

/// Sending end written from task context.
pub trait TaskSender<T> {
    /// Enqueue without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Full`] if there is no free slot.
    fn try_write(&mut self, item: T) -> Result<()>;
}

/// Receiving end read from task context.
pub trait TaskReceiver<T> {
    /// Take the oldest element, if any.
    fn try_read(&mut self) -> Option<T>;
}

impl<'a, T, const N: usize> IsrReceiver<T> for Consumer<'a, T, N> {
    #[inline]
    fn try_read_isr(&mut self) -> Option<T> {
        self.dequeue()
    }

    #[inline]
    fn has_message_isr(&self) -> bool {
        self.ready()
    }
}

impl<'a, T, const N: usize> TaskReceiver<T> for Consumer<'a, T, N> {
    #[inline]
    fn try_read(&mut self) -> Option<T> {
        self.dequeue()
    }
}

impl<'a, T, const N: usize> IsrSender<T> for Producer<'a, T, N> {
    #[inline]
    fn try_write_isr(&mut self, item: T) -> core::result::Result<(), T> {
        self.enqueue(item)
    }
}

impl<'a, T, const N: usize> TaskSender<T> for Producer<'a, T, N> {
    fn try_write(&mut self, item: T) -> Result<()> {
        self.enqueue(item).map_err(|_| QueueError::Full.into())
    }
}

impl<T, const N: usize> IsrReceiver<T> for Queue<T, N> {
    #[inline]
    fn try_read_isr(&mut self) -> Option<T> {
        self.dequeue()
    }

    #[inline]
    fn has_message_isr(&self) -> bool {
        !self.is_empty()
    }
}

impl<T, const N: usize> TaskReceiver<T> for Queue<T, N> {
    #[inline]
    fn try_read(&mut self) -> Option<T> {
        self.dequeue()
    }
}

impl<T, const N: usize> IsrSender<T> for Queue<T, N> {
    #[inline]
    fn try_write_isr(&mut self, item: T) -> core::result::Result<(), T> {
        self.enqueue(item)
    }
}

impl<T, const N: usize> TaskSender<T> for Queue<T, N> {
    fn try_write(&mut self, item: T) -> Result<()> {
        self.enqueue(item).map_err(|_| QueueError::Full.into())
    }
}
