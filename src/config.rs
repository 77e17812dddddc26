//! Tunables for the codec and its transaction helpers.
//!
//! A handful of constants (idle-symbol budget, control-transfer timeouts,
//! max packet size) would otherwise be scattered as magic numbers through
//! [`crate::line`] and [`crate::transaction`]; `CodecConfig` collects them
//! in one place, including a finite cap on the NAK-retry loops that the
//! USB 1.1 control transfer protocol (§8.5.3) leaves open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Idle symbol-times to drive before giving up on a response in
    /// [`crate::line::LineDriver::try_receive`].
    pub max_idle_symbols: usize,

    /// Upper bound on NAK retries in [`crate::transaction`] helpers before
    /// giving up with [`crate::error::TransferError::RetryBudgetExhausted`].
    /// A device is free to NAK indefinitely; this crate defaults to a
    /// generous but finite cap so a faulty device cannot hang a caller.
    pub nak_retry_cap: usize,

    /// Attempts allowed while waiting for the ACK that concludes the
    /// SETUP/DATA0 stage of a control transfer (USB 1.1 §8.5.3).
    pub setup_ack_timeout: usize,

    /// Maximum payload size of a single DATA packet for the attached
    /// device; used to recognize a short packet that ends an IN data
    /// stage (USB 1.1 §8.5.3, §5.3.2).
    pub max_packet_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            max_idle_symbols: 8,
            nak_retry_cap: 256,
            setup_ack_timeout: 8,
            max_packet_size: 8,
        }
    }
}
