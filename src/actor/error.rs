#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("queue is empty")]
    QueueEmpty,

    #[error("error processing task: {message}")]
    Process { message: String },
}
