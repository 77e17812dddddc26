//! Error taxonomy for the codec layer.
//!
//! Low-level decode failures never throw: [`crate::packet::PacketCodec::try_decode`]
//! and friends return `Option`/`Result` values whose `Err`/`None` arms the
//! caller treats as "no response". [`TransferError`] is the only type that
//! surfaces out of [`crate::transaction`]'s higher-level helpers, where
//! accumulated low-level failures are converted into a single outcome.

use thiserror::Error;

/// Reasons a symbol stream or bit-vector failed to decode into a [`crate::packet::Packet`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The stream did not begin with the eight-symbol SYNC pattern.
    #[error("missing SYNC pattern")]
    MissingSync,

    /// The stream did not end with the `SE0 SE0 J` EOP sequence.
    #[error("missing EOP sequence")]
    MissingEop,

    /// An `SE1` symbol appeared in a received stream; always invalid.
    #[error("invalid SE1 symbol in received stream")]
    InvalidSe1,

    /// A run of six consecutive one-bits was not followed by a stuff bit,
    /// or a run exceeded six ones before destuffing, indicating a corrupted
    /// stream.
    #[error("bit-stuffing violation: ones-run of {0} without a stuff bit")]
    BadStuffing(u32),

    /// The decoded bit-stream was shorter than the minimum for any known
    /// packet kind.
    #[error("symbol stream too short to contain a packet ({0} symbols)")]
    TooShort(usize),

    /// The 8-bit PID field did not match any known packet kind.
    #[error("unknown PID: {0:#010b}")]
    UnknownPid(u8),

    /// A DATA packet's payload, after the 16-bit PID, was not a whole
    /// number of bytes.
    #[error("data payload not byte-aligned: {0} bits")]
    UnalignedPayload(usize),

    /// The trailing CRC did not match the CRC computed over the payload.
    #[error("CRC mismatch: wire={wire:#x} computed={computed:#x}")]
    CrcMismatch {
        /// CRC residue as found on the wire.
        wire: u32,
        /// CRC residue computed by the decoder.
        computed: u32,
    },
}

/// Outcome of a [`crate::transaction`] control-transfer helper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// No ACK was observed for the SETUP/DATA stage within the configured
    /// attempt budget.
    #[error("setup stage timed out after {0} attempts")]
    SetupTimeout(usize),

    /// A read or write data stage retried NAKs past the configured cap
    /// without making progress.
    #[error("retry budget of {0} exhausted without a usable response")]
    RetryBudgetExhausted(usize),

    /// A response was received but decoded to an unexpected packet kind
    /// for the current stage (e.g. a DATA toggle mismatch, or neither
    /// ACK nor NAK where one was required).
    #[error("unexpected response in {stage} stage")]
    UnexpectedResponse {
        /// Name of the transfer stage in which the mismatch occurred.
        stage: &'static str,
    },

    /// No response was observed at all (the device never asserted `oe`).
    #[error("no response in {stage} stage")]
    NoResponse {
        /// Name of the transfer stage in which the timeout occurred.
        stage: &'static str,
    },
}
