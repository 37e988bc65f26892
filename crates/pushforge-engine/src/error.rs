#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("a send is already in progress")]
    AlreadySending,

    #[error("not ready to send: {0}")]
    NotReady(String),

    #[error("unknown device: {0}")]
    UnknownDevice(String),

    #[error("boot failed: {0}")]
    BootFailed(String),
}
