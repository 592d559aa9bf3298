pub mod aws;
pub mod share_sync;
pub mod trigger;

/// Automation document shared out of the management account.
pub const LICENSE_TRACKING_DOCUMENT: &str = "Secondary-SQLServerLicenseTrackingSolution-Document";

#[derive(Debug)]
pub enum HandlerError {
    InvalidEvent(String),
    AutomationNotStarted,
    ShareSyncFailed(String),
    Sdk(String),
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerError::InvalidEvent(msg) => write!(f, "Invalid Event: {}", msg),
            HandlerError::AutomationNotStarted => write!(f, "automation execution not started"),
            HandlerError::ShareSyncFailed(msg) => write!(f, "Share Sync Error: {}", msg),
            HandlerError::Sdk(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for HandlerError {}
