pub mod card;
pub mod teams;

pub use card::{AdaptiveCard, CardElement, Fact, TeamsMessage};
pub use teams::TeamsSender;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for delivering a card to the chat channel
#[async_trait]
pub trait CardSender: Send + Sync {
    /// Post the message once; returns the HTTP status the webhook answered with
    async fn send_card(&self, message: &TeamsMessage) -> Result<u16>;
}
