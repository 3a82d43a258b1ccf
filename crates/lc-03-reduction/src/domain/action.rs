//! User actions that map to particle groups.

use shared_types::{Address, PositiveAmount, ResourceIdentifier};

/// Send `amount` of `rri` from `from` to `to`, optionally with a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTokensAction {
    /// Sender.
    pub from: Address,
    /// Recipient.
    pub to: Address,
    /// Amount in subunits.
    pub amount: PositiveAmount,
    /// Token.
    pub rri: ResourceIdentifier,
    /// Attached message bytes.
    pub message: Option<Vec<u8>>,
}

impl TransferTokensAction {
    /// Transfer without a message.
    #[must_use]
    pub fn new(from: Address, to: Address, amount: PositiveAmount, rri: ResourceIdentifier) -> Self {
        Self {
            from,
            to,
            amount,
            rri,
            message: None,
        }
    }

    /// Same transfer with a message attached.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<Vec<u8>>) -> Self {
        self.message = Some(message.into());
        self
    }
}
