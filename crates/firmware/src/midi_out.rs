//! Sends MIDI over a UART, i.e., a classic 5-pin DIN MIDI output.

use defmt::error;
use embassy_stm32::{mode::Async, usart::UartTx};
use octave_keys_lib::controller::MidiSink;

/// The MIDI 1.0 serial data rate.
pub const MIDI_BAUD_RATE: u32 = 31_250;

/// A [`MidiSink`] which writes to the transmit half of a UART.
pub struct UartSink {
    tx: UartTx<'static, Async>,
}

impl UartSink {
    /// Constructs a [`UartSink`]. The UART should already be configured for [`MIDI_BAUD_RATE`].
    pub fn new(tx: UartTx<'static, Async>) -> Self {
        Self { tx }
    }
}

impl MidiSink for UartSink {
    async fn emit(&mut self, message: [u8; 3]) {
        if let Err(e) = self.tx.write(&message).await {
            error!("Failed to send MIDI message {:x}: {}", message, e);
        }
    }
}
