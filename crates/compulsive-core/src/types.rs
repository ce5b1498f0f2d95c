use lettre::{message::Mailbox, Address};
use serde::{Deserialize, Serialize};

use crate::config::EmailConfig;

/// A display name plus mail address, used for the sender and every recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub address: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Parse into a mail mailbox. An empty name yields a bare address.
    ///
    /// The name is carried as-is, so commas or quotes in it need no escaping.
    pub fn mailbox(&self) -> Result<Mailbox, lettre::address::AddressError> {
        let address: Address = self.address.trim().parse()?;
        let name = (!self.name.is_empty()).then(|| self.name.clone());
        Ok(Mailbox::new(name, address))
    }
}

/// Renders as `Name <address>`.
impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.address)
    }
}

/// One outgoing change alert. Built per detected change and dropped after the send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// Every configured recipient, in configured order. All go into one message.
    pub recipients: Vec<Identity>,
    /// Displays as `Name <address>`.
    pub sender: Identity,
    pub subject: String,
    /// Configured body with the watched URL appended.
    pub body: String,
    /// Attach an HTML alternative part.
    pub html: bool,
}

impl NotificationRequest {
    /// Build the alert for a change detected on `url`.
    pub fn for_change(email: &EmailConfig, url: &str) -> Self {
        Self {
            recipients: email.to.clone(),
            sender: email.from.clone(),
            subject: email.subject.clone(),
            body: format!("{} - site: {}", email.body, url),
            html: email.html,
        }
    }
}
