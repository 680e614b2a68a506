use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tokio::time::{Duration, Instant};

use crate::actor::broker::{Broker, SIGNAL_TOPIC, Topic};
use crate::actor::model::{CommandRequest, InternalMessage, Queue, Task};
use crate::actor::worker::spawn_worker;

const COMMAND_CAPACITY: usize = 256;
const MAX_WAIT_TIME: Duration = Duration::from_secs(10);
const INTAKE_TIMEOUT: Duration = Duration::from_secs(5);
const WORKER_TIMEOUT: Duration = Duration::from_secs(5);
const DRAIN_POLL: Duration = Duration::from_millis(50);

pub struct Dispatcher {
    broker: Broker,
    queue: Queue,
    active_tasks: Arc<AtomicUsize>,

    commands: mpsc::Sender<CommandRequest>,
    command_receiver: Option<mpsc::Receiver<CommandRequest>>,
    close_intake: Option<oneshot::Sender<()>>,

    handles: JoinSet<()>,
    intake_handle: Option<tokio::task::JoinHandle<()>>,
}

impl Dispatcher {
    pub fn new(broker: Broker) -> Self {
        let (commands, command_receiver) = mpsc::channel(COMMAND_CAPACITY);

        Self {
            broker,
            queue: Arc::new(Mutex::new(VecDeque::<Task>::new())),
            active_tasks: Arc::new(AtomicUsize::new(0)),
            commands,
            command_receiver: Some(command_receiver),
            close_intake: None,
            handles: JoinSet::new(),
            intake_handle: None,
        }
    }

    /// Sender that connections use to submit commands. Sends fail once shutdown
    /// has closed the intake.
    pub fn commands(&self) -> mpsc::Sender<CommandRequest> {
        self.commands.clone()
    }

    pub fn signal(
        &self,
        msg: InternalMessage,
    ) -> Result<usize, tokio::sync::broadcast::error::SendError<InternalMessage>> {
        self.broker.topic(SIGNAL_TOPIC).publish(msg)
    }

    pub async fn start(&mut self, workers: u8) {
        let Some(command_receiver) = self.command_receiver.take() else {
            tracing::warn!("Dispatcher already started");
            return;
        };

        for _ in 0..workers {
            let rx = self.broker.subscribe(SIGNAL_TOPIC);
            self.handles
                .spawn(spawn_worker(rx, self.queue.clone(), self.active_tasks.clone()));
        }

        let (close_tx, close_rx) = oneshot::channel();
        self.close_intake = Some(close_tx);
        self.intake_handle = Some(tokio::spawn(run_intake(
            command_receiver,
            close_rx,
            self.queue.clone(),
            self.broker.topic(SIGNAL_TOPIC),
        )));

        tracing::info!("Dispatcher started with {} workers", workers);
    }

    /// Closes the intake, answers everything already accepted, then stops the workers.
    pub async fn stop(&mut self) {
        tracing::info!("Initiating graceful shutdown...");

        self.shut_intake().await;
        let _ = self.signal(InternalMessage::GracefulStop);
        self.wait_for_drain().await;

        let _ = self.signal(InternalMessage::Stop);
        self.join_workers().await;

        tracing::info!("All tasks completed and workers stopped.");
    }

    pub async fn force_stop(&mut self) {
        tracing::warn!("Force stopping dispatcher...");

        self.close_intake.take();
        if let Some(handle) = self.intake_handle.take() {
            handle.abort();
        }
        let _ = self.signal(InternalMessage::Stop);
        self.handles.abort_all();

        tracing::warn!("Force stop completed - all tasks and workers terminated immediately.");
    }

    pub fn active_task_count(&self) -> usize {
        self.active_tasks.load(Ordering::SeqCst)
    }

    pub fn pending_task_count(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    async fn shut_intake(&mut self) {
        // Never started: nothing will ever read what is buffered
        if let Some(mut receiver) = self.command_receiver.take() {
            receiver.close();
        }
        if let Some(close) = self.close_intake.take() {
            let _ = close.send(());
        }
        if let Some(handle) = self.intake_handle.take() {
            if tokio::time::timeout(INTAKE_TIMEOUT, handle).await.is_err() {
                tracing::warn!("Command intake did not close in time, continuing shutdown");
            }
        }
    }

    async fn wait_for_drain(&self) {
        let deadline = Instant::now() + MAX_WAIT_TIME;

        loop {
            let active = self.active_task_count();
            let pending = self.pending_task_count();
            if active == 0 && pending == 0 {
                return;
            }
            if Instant::now() >= deadline {
                tracing::warn!(
                    "Shutdown deadline reached with {} active and {} pending tasks",
                    active,
                    pending
                );
                return;
            }

            tracing::debug!("Draining: {} active, {} pending", active, pending);
            if active == 0 {
                let _ = self.signal(InternalMessage::TaskAdded);
            }
            tokio::time::sleep(DRAIN_POLL).await;
        }
    }

    async fn join_workers(&mut self) {
        let handles = &mut self.handles;
        let joined = tokio::time::timeout(WORKER_TIMEOUT, async {
            while let Some(result) = handles.join_next().await {
                if let Err(e) = result {
                    tracing::warn!("Worker stopped with error: {:?}", e);
                }
            }
        })
        .await;

        if joined.is_err() {
            tracing::warn!("Timeout waiting for workers to stop. Aborting remaining workers.");
            self.handles.abort_all();
        }
    }
}

/// Moves commands into the task queue until told to close. On close, commands
/// that were already accepted are still queued before the intake exits.
async fn run_intake(
    mut commands: mpsc::Receiver<CommandRequest>,
    mut close: oneshot::Receiver<()>,
    queue: Queue,
    signals: Topic,
) {
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(request) => enqueue(&queue, &signals, request),
                None => break,
            },
            _ = &mut close => {
                commands.close();
                while let Some(request) = commands.recv().await {
                    enqueue(&queue, &signals, request);
                }
                break;
            }
        }
    }

    tracing::info!("Command intake closed.");
}

fn enqueue(queue: &Queue, signals: &Topic, request: CommandRequest) {
    tracing::info!(
        "Received command {} from {}: {:?}",
        request.request_id,
        request.owner,
        request.command
    );
    {
        queue.lock().unwrap().push_back(Task::from(request));
    }
    let _ = signals.publish(InternalMessage::TaskAdded);
}
