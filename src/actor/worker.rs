use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::actor::{
    error::Error,
    model::{InternalMessage, Queue, ResponseSignal},
};
use crate::api::command::handle_invocation;

pub async fn spawn_worker(
    receiver: tokio::sync::broadcast::Receiver<InternalMessage>,
    queue: Queue,
    active_tasks: Arc<AtomicUsize>,
) {
    let worker_id = Uuid::new_v4();
    let mut rx = receiver;
    tracing::info!("Worker {} started, waiting for signals...", worker_id);

    loop {
        match rx.recv().await {
            Ok(InternalMessage::TaskAdded) | Ok(InternalMessage::GracefulStop) => {
                drain(&queue, &active_tasks, worker_id).await;
            }
            Ok(InternalMessage::Stop) => {
                tracing::info!("Worker {} received stop signal, exiting...", worker_id);
                break;
            }
            Err(RecvError::Lagged(skipped)) => {
                // A missed wake-up only delays work, the queue still holds every task
                tracing::warn!("Worker {} lagged by {} signals", worker_id, skipped);
                drain(&queue, &active_tasks, worker_id).await;
            }
            Err(RecvError::Closed) => {
                tracing::warn!("Signal channel closed, worker {} exiting", worker_id);
                break;
            }
        }
    }

    tracing::info!("Worker {} finished processing signals.", worker_id);
}

/// Processes tasks until the queue is empty, returning how many were taken.
async fn drain(queue: &Queue, active_tasks: &Arc<AtomicUsize>, worker_id: Uuid) -> usize {
    let mut taken = 0;
    loop {
        match process_next(queue.clone(), active_tasks.clone(), worker_id).await {
            Ok(()) => taken += 1,
            Err(Error::QueueEmpty) => break,
            Err(Error::Process { message }) => {
                taken += 1;
                tracing::error!("Error processing task: {}", message);
            }
        }
    }
    if taken > 0 {
        tracing::debug!("Worker {} drained {} tasks", worker_id, taken);
    }
    taken
}

async fn process_next(
    queue: Queue,
    active_tasks: Arc<AtomicUsize>,
    worker_id: Uuid,
) -> Result<(), Error> {
    // Counted as active before leaving the queue so a task is never invisible to shutdown
    let task = {
        let mut queue = queue.lock().unwrap();
        let task = queue.pop_front();
        if task.is_some() {
            active_tasks.fetch_add(1, Ordering::SeqCst);
        }
        task
    };
    let Some(task) = task else {
        return Err(Error::QueueEmpty);
    };

    tracing::debug!(
        "Worker {} started task {} (request {} from {})",
        worker_id,
        task.id,
        task.request_id,
        task.owner
    );

    let content = handle_invocation(&task.command);
    let sent = task
        .respond_to
        .send(ResponseSignal::Reply {
            id: task.request_id,
            content,
        })
        .await;

    active_tasks.fetch_sub(1, Ordering::SeqCst);
    tracing::debug!("Completed task with ID: {}", task.id);

    sent.map_err(|e| Error::Process {
        message: format!("failed to send reply for task {}: {}", task.id, e),
    })
}
