/// Where a message is headed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// Multi-recipient destination.
    Channel,
    /// One-to-one message.
    Direct,
}

/// Whether the sender is connected to this node or relayed from elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    Local,
    Remote,
}

/// An outbound message as handed to the delivery hook.
///
/// The host owns it; the hook may only replace `body`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    pub originator: String,
    pub body: String,
    pub target: TargetKind,
    pub origin: Origin,
}

impl OutboundMessage {
    pub fn new(
        originator: impl Into<String>,
        body: impl Into<String>,
        target: TargetKind,
        origin: Origin,
    ) -> Self {
        Self {
            originator: originator.into(),
            body: body.into(),
            target,
            origin,
        }
    }

    /// Body length in chars, the unit the cutoff and snippet are measured in.
    pub fn body_len(&self) -> usize {
        self.body.chars().count()
    }
}

/// Disposition returned to the host. The hook never blocks a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModResult {
    PassThrough,
}
