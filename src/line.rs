//! Clocks the device-under-test one symbol at a time and reassembles its
//! responses.
//!
//! [`Device`] is the interface contract for the device-under-test itself —
//! a logic simulator (or, in tests, a mock) clocked per bit-time. This crate
//! never implements a concrete device; it only drives and samples one
//! through this trait.

use crate::config::CodecConfig;
use crate::symbol::{Symbol, SymbolStream};
use crate::trace::TraceSink;

/// The device-under-test's line-level interface: the inputs the host drives
/// and the outputs it samples (USB 1.1 §7.1, electrical signaling). One
/// [`Device::step`] call advances the simulator by one `clk` cycle (a rising
/// and falling edge).
pub trait Device {
    /// Drives the `j_not_k` input line.
    fn set_j_not_k(&mut self, value: bool);
    /// Drives the `se0` input line.
    fn set_se0(&mut self, value: bool);
    /// Drives the `rst` input line.
    fn set_rst(&mut self, value: bool);
    /// Advances the simulator by one `clk` cycle.
    fn step(&mut self);

    /// Output-enable: high while the device drives the bus.
    fn oe(&self) -> bool;
    /// Device-driven `j_not_k` output, valid while [`Device::oe`] is high.
    fn o_j_not_k(&self) -> bool;
    /// Device-driven `se0` output, valid while [`Device::oe`] is high.
    fn o_se0(&self) -> bool;
    /// High once the device has completed attach after reset.
    fn attach(&self) -> bool;
}

/// One simulated bit-time equals this many `clk` cycles.
pub const TICKS_PER_SYMBOL: u32 = 10;

/// Drives and samples a [`Device`] one symbol-time at a time.
///
/// Holds its collaborators by exclusive reference rather than through a
/// process-wide global handle: lifecycle is `new -> use -> drop`, scoped to
/// the call site.
pub struct LineDriver<'a, D: Device> {
    device: &'a mut D,
    trace: Option<&'a mut dyn TraceSink>,
    config: CodecConfig,
}

impl<'a, D: Device> LineDriver<'a, D> {
    /// Builds a driver around `device` with the default [`CodecConfig`].
    pub fn new(device: &'a mut D) -> Self {
        LineDriver {
            device,
            trace: None,
            config: CodecConfig::default(),
        }
    }

    /// Builds a driver with an explicit configuration and trace sink.
    pub fn with_config(
        device: &'a mut D,
        config: CodecConfig,
        trace: Option<&'a mut dyn TraceSink>,
    ) -> Self {
        LineDriver { device, trace, config }
    }

    /// Drives `sym` onto the device's input lines and advances the
    /// simulator by [`TICKS_PER_SYMBOL`] clock cycles. The effect of this
    /// call is fully observed by the device before the next `clock_symbol`
    /// begins.
    pub fn clock_symbol(&mut self, sym: Symbol) {
        match sym {
            Symbol::J => {
                self.device.set_j_not_k(true);
                self.device.set_se0(false);
            }
            Symbol::K => {
                self.device.set_j_not_k(false);
                self.device.set_se0(false);
            }
            Symbol::SE0 => {
                self.device.set_j_not_k(false);
                self.device.set_se0(true);
            }
            // SE1 is invalid on a healthy bus and is never driven outbound.
            Symbol::SE1 => {}
        }

        for _ in 0..TICKS_PER_SYMBOL {
            self.device.step();
        }

        if let Some(sink) = self.trace.as_deref_mut() {
            sink.on_symbol(sym);
        }
    }

    /// Drives idle `J` while polling the device's `oe` line, and once it
    /// rises, samples `(oe, j_not_k, se0)` every subsequent symbol-time for
    /// as long as `oe` stays asserted — even beyond `max_idle_symbols`.
    /// Returns an empty stream if nothing was received, or if the received
    /// stream fails SYNC/EOP framing.
    pub fn try_receive(&mut self, max_idle_symbols: usize) -> SymbolStream {
        let mut received = Vec::new();
        let mut i = 0;

        while i < max_idle_symbols || self.device.oe() {
            self.clock_symbol(Symbol::J);

            if self.device.oe() {
                let sym = if self.device.o_se0() {
                    Symbol::SE0
                } else if self.device.o_j_not_k() {
                    Symbol::J
                } else {
                    Symbol::K
                };
                received.push(sym);
            }

            i += 1;
        }

        let stream = SymbolStream::from_symbols(received);
        if stream.is_empty() || !stream.starts_with_sync() || !stream.ends_with_eop() {
            log::debug!("try_receive: no valid response ({} symbols sampled)", stream.len());
            return SymbolStream::new();
        }

        stream
    }

    /// Drives `try_receive` with this driver's configured idle budget.
    pub fn try_receive_default(&mut self) -> SymbolStream {
        self.try_receive(self.config.max_idle_symbols)
    }

    /// Pulses `rst`, releases it, drives idle `J` until `attach` rises, then
    /// drives a handful of additional idle symbols so the device settles
    /// into a quiescent post-attach state.
    pub fn reset_and_attach(&mut self) {
        self.device.set_rst(true);
        self.clock_symbol(Symbol::J);
        self.device.set_rst(false);

        while !self.device.attach() {
            self.clock_symbol(Symbol::J);
        }

        const SETTLE_SYMBOLS: usize = 4;
        for _ in 0..SETTLE_SYMBOLS {
            self.clock_symbol(Symbol::J);
        }
    }
}
