//! 8N1 serial transmitter for the debug line.
//!
//! Each bit is held for `divisor` ticks. The line idles high.

/// Transmitter state machine tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TxState {
    /// Line idles high; a request is accepted here only.
    #[default]
    Idle,
    /// Low start bit.
    Start,
    /// Data bit `bit` (0 = least significant) on the line.
    Data {
        /// Index of the bit currently on the line.
        bit: u8,
    },
    /// High stop bit.
    Stop,
}

/// Registers of the serial transmitter.
///
/// Every state lasts exactly `divisor` ticks. One byte is in flight at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct UartTx {
    state: TxState,
    ticks: u16,
    shift: u8,
}

impl UartTx {
    /// Returns the current state machine tag.
    #[must_use]
    pub const fn state(&self) -> TxState {
        self.state
    }

    /// Returns true from an accepted request until the stop bit completes.
    #[must_use]
    pub const fn busy(&self) -> bool {
        !matches!(self.state, TxState::Idle)
    }

    /// Returns the serial line level.
    #[must_use]
    pub const fn line(&self) -> bool {
        match self.state {
            TxState::Idle | TxState::Stop => true,
            TxState::Start => false,
            TxState::Data { .. } => self.shift & 1 == 1,
        }
    }

    /// Computes the registers after one tick.
    ///
    /// `request` carries a byte to send; it is ignored unless the transmitter
    /// is idle.
    #[must_use]
    pub const fn next(&self, request: Option<u8>, divisor: u16) -> Self {
        if let TxState::Idle = self.state {
            return match request {
                Some(byte) => Self {
                    state: TxState::Start,
                    ticks: 0,
                    shift: byte,
                },
                None => *self,
            };
        }

        if self.ticks + 1 < divisor {
            return Self {
                ticks: self.ticks + 1,
                ..*self
            };
        }

        let (state, shift) = match self.state {
            TxState::Start => (TxState::Data { bit: 0 }, self.shift),
            TxState::Data { bit } if bit < 7 => (TxState::Data { bit: bit + 1 }, self.shift >> 1),
            TxState::Data { .. } => (TxState::Stop, self.shift >> 1),
            TxState::Stop | TxState::Idle => (TxState::Idle, self.shift),
        };
        Self {
            state,
            ticks: 0,
            shift,
        }
    }
}
