//! Lock-free single-producer single-consumer ring buffer for control data.
//!
//! The producer never blocks: when a write does not fit, it first reclaims
//! the oldest unread samples by advancing the read cursor. The consumer
//! copies whatever is available into a scratch buffer and only publishes it
//! if the producer did not reclaim those slots while it was copying, so a
//! read either returns a complete, untorn set of samples or nothing at all.
//!
//! Slots are stored as atomics (relaxed loads and stores) so the rare
//! overwrite race is well defined; the cursors carry the ordering.

use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{CanvasError, Result};

/// Element types that can live in a [`RingBuffer`] slot.
pub trait RingSample: Copy + Default + Send + Sync + 'static {
    type Cell: Send + Sync;

    fn new_cell(value: Self) -> Self::Cell;
    fn load(cell: &Self::Cell) -> Self;
    fn store(cell: &Self::Cell, value: Self);
}

impl RingSample for f32 {
    type Cell = AtomicU32;

    fn new_cell(value: Self) -> Self::Cell {
        AtomicU32::new(value.to_bits())
    }

    #[inline(always)]
    fn load(cell: &Self::Cell) -> Self {
        f32::from_bits(cell.load(Ordering::Relaxed))
    }

    #[inline(always)]
    fn store(cell: &Self::Cell, value: Self) {
        cell.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl RingSample for f64 {
    type Cell = AtomicU64;

    fn new_cell(value: Self) -> Self::Cell {
        AtomicU64::new(value.to_bits())
    }

    #[inline(always)]
    fn load(cell: &Self::Cell) -> Self {
        f64::from_bits(cell.load(Ordering::Relaxed))
    }

    #[inline(always)]
    fn store(cell: &Self::Cell, value: Self) {
        cell.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl RingSample for u32 {
    type Cell = AtomicU32;

    fn new_cell(value: Self) -> Self::Cell {
        AtomicU32::new(value)
    }

    #[inline(always)]
    fn load(cell: &Self::Cell) -> Self {
        cell.load(Ordering::Relaxed)
    }

    #[inline(always)]
    fn store(cell: &Self::Cell, value: Self) {
        cell.store(value, Ordering::Relaxed);
    }
}

/// Shared storage. Cursors are free-running counters; slot = cursor & mask.
pub struct RingBuffer<T: RingSample> {
    slots: Box<[T::Cell]>,
    mask: usize,
    write_pos: AtomicUsize,
    read_pos: AtomicUsize,
}

impl<T: RingSample> RingBuffer<T> {
    /// Allocate a ring of at least `min_capacity` samples (rounded up to a power of two)
    /// and split it into its producer and consumer halves.
    pub fn new(min_capacity: usize) -> Result<(RingProducer<T>, RingConsumer<T>)> {
        let capacity = match min_capacity.checked_next_power_of_two() {
            Some(capacity) if min_capacity > 0 => capacity,
            _ => {
                return Err(CanvasError::RingCapacity {
                    requested: min_capacity,
                })
            }
        };

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| CanvasError::RingCapacity {
                requested: min_capacity,
            })?;
        slots.extend((0..capacity).map(|_| T::new_cell(T::default())));

        let mut scratch = Vec::new();
        let mut output = Vec::new();
        scratch
            .try_reserve_exact(capacity)
            .and_then(|_| output.try_reserve_exact(capacity))
            .map_err(|_| CanvasError::RingCapacity {
                requested: min_capacity,
            })?;
        scratch.resize(capacity, T::default());
        output.resize(capacity, T::default());

        let ring = Arc::new(RingBuffer {
            slots: slots.into_boxed_slice(),
            mask: capacity - 1,
            write_pos: AtomicUsize::new(0),
            read_pos: AtomicUsize::new(0),
        });

        log::debug!("ring buffer allocated with capacity {}", capacity);

        Ok((
            RingProducer {
                ring: Arc::clone(&ring),
            },
            RingConsumer {
                ring,
                scratch: scratch.into_boxed_slice(),
                output: output.into_boxed_slice(),
            },
        ))
    }

    pub fn capacity(&self) -> usize {
        self.mask + 1
    }

    fn read_available(&self) -> usize {
        let write = self.write_pos.load(Ordering::Acquire);
        let read = self.read_pos.load(Ordering::Acquire);
        write.wrapping_sub(read).min(self.capacity())
    }
}

/// Writing half. Not `Clone`: exactly one producer may exist.
pub struct RingProducer<T: RingSample> {
    ring: Arc<RingBuffer<T>>,
}

impl<T: RingSample> RingProducer<T> {
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Write `data` as one unit, discarding the oldest unread samples if it
    /// does not fit. Never blocks.
    pub fn write(&mut self, data: &[T]) -> Result<usize> {
        let ring = &*self.ring;
        let capacity = ring.capacity();
        let count = data.len();
        if count > capacity {
            return Err(CanvasError::PayloadTooLarge {
                len: count,
                capacity,
            });
        }
        if count == 0 {
            return Ok(0);
        }

        let write = ring.write_pos.load(Ordering::Relaxed);
        loop {
            let read = ring.read_pos.load(Ordering::Acquire);
            let occupied = write.wrapping_sub(read);
            if capacity - occupied >= count {
                break;
            }
            let discard = count.min(occupied);
            if ring
                .read_pos
                .compare_exchange_weak(
                    read,
                    read.wrapping_add(discard),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok()
            {
                break;
            }
        }

        for (i, &value) in data.iter().enumerate() {
            T::store(&ring.slots[write.wrapping_add(i) & ring.mask], value);
        }
        ring.write_pos
            .store(write.wrapping_add(count), Ordering::Release);

        Ok(count)
    }

    pub fn read_available(&self) -> usize {
        self.ring.read_available()
    }
}

/// Reading half, owned by the audio thread.
pub struct RingConsumer<T: RingSample> {
    ring: Arc<RingBuffer<T>>,
    scratch: Box<[T]>,
    output: Box<[T]>,
}

impl<T: RingSample> RingConsumer<T> {
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    pub fn read_available(&self) -> usize {
        self.ring.read_available()
    }

    /// Drain everything currently available into the output buffer and return
    /// how many samples were read. Returns 0 when nothing is pending or when
    /// the producer reclaimed the pending samples mid-copy; in both cases the
    /// output buffer keeps its previous contents. Wait-free and allocation-free.
    pub fn read(&mut self) -> usize {
        let ring = &*self.ring;
        let read = ring.read_pos.load(Ordering::Acquire);
        let write = ring.write_pos.load(Ordering::Acquire);
        let count = write.wrapping_sub(read).min(self.scratch.len());
        if count == 0 {
            return 0;
        }

        for (i, slot) in self.scratch[..count].iter_mut().enumerate() {
            *slot = T::load(&ring.slots[read.wrapping_add(i) & ring.mask]);
        }

        if ring
            .read_pos
            .compare_exchange(
                read,
                read.wrapping_add(count),
                Ordering::AcqRel,
                Ordering::Relaxed,
            )
            .is_err()
        {
            return 0;
        }

        self.output[..count].copy_from_slice(&self.scratch[..count]);
        count
    }

    /// Samples from the most recent successful [`read`](Self::read), padded
    /// with older contents up to the ring capacity.
    pub fn output(&self) -> &[T] {
        &self.output
    }
}
