pub mod ring_buffer;

pub use ring_buffer::{RingBuffer, RingConsumer, RingProducer, RingSample};
