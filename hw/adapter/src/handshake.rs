/*++

Licensed under the Apache-2.0 license.

File Name:

    handshake.rs

Abstract:

    File contains the valid/ready transfer primitives shared by all five
    AXI4-Lite channels.

--*/

/// Driving end of a channel. Holds valid and the payload stable from
/// [`Source::offer`] until a clock edge samples ready.
#[derive(Clone, Copy, Debug, Default)]
pub struct Source<T: Copy + Default> {
    valid: bool,
    payload: T,
}

impl<T: Copy + Default> Source<T> {
    /// Start driving `payload`.
    pub fn offer(&mut self, payload: T) {
        debug_assert!(!self.valid, "payload offered while a transfer is pending");
        self.valid = true;
        self.payload = payload;
    }

    /// Sample `ready` on a clock edge. Returns the payload if the transfer was
    /// accepted on this edge.
    pub fn clock(&mut self, ready: bool) -> Option<T> {
        if self.valid && ready {
            self.valid = false;
            Some(self.payload)
        } else {
            None
        }
    }

    pub fn valid(&self) -> bool {
        self.valid
    }

    /// The value on the payload wires. Keeps the last offered value once
    /// accepted.
    pub fn payload(&self) -> T {
        self.payload
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Receiving end of a channel. Consumes each transfer exactly once.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sink {
    latched: bool,
}

impl Sink {
    /// Sample `ready` and `valid` on a clock edge. Returns the payload on the
    /// first acceptance; later edges return `None` until [`Sink::release`].
    pub fn clock<T>(&mut self, ready: bool, valid: bool, payload: T) -> Option<T> {
        if !self.latched && ready && valid {
            self.latched = true;
            Some(payload)
        } else {
            None
        }
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Arm the sink for the next transfer.
    pub fn release(&mut self) {
        self.latched = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_holds_until_ready() {
        let mut src = Source::<u32>::default();
        assert!(!src.valid());
        assert_eq!(src.clock(true), None);

        src.offer(0x1000);
        assert_eq!(src.clock(false), None);
        assert_eq!(src.clock(false), None);
        assert!(src.valid());
        assert_eq!(src.payload(), 0x1000);

        assert_eq!(src.clock(true), Some(0x1000));
        assert!(!src.valid());
        assert_eq!(src.clock(true), None);
        assert_eq!(src.payload(), 0x1000);
    }

    #[test]
    fn test_source_clear() {
        let mut src = Source::<u32>::default();
        src.offer(5);
        src.clear();
        assert!(!src.valid());
        assert_eq!(src.payload(), 0);
        src.offer(6);
        assert_eq!(src.clock(true), Some(6));
    }

    #[test]
    fn test_sink_latches_once() {
        let mut sink = Sink::default();
        assert_eq!(sink.clock(true, false, 1u32), None);
        assert_eq!(sink.clock(false, true, 1u32), None);
        assert!(!sink.is_latched());

        assert_eq!(sink.clock(true, true, 2u32), Some(2));
        assert!(sink.is_latched());
        assert_eq!(sink.clock(true, true, 3u32), None);

        sink.release();
        assert_eq!(sink.clock(true, true, 4u32), Some(4));
    }
}
