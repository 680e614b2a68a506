use std::{
    collections::VecDeque,
    fmt,
    sync::{Arc, Mutex},
};

use serde::Serialize;
use uuid::Uuid;

use crate::troop::model::TrainRequest;

pub type Queue = Arc<Mutex<VecDeque<Task>>>;

#[derive(Debug)]
pub struct CommandRequest {
    pub owner: Uuid,
    pub request_id: String,
    pub command: TrainRequest,
    pub respond_to: tokio::sync::mpsc::Sender<ResponseSignal>,
}

#[derive(Debug)]
pub struct Task {
    pub id: Uuid,
    pub owner: Uuid,
    pub request_id: String,
    pub command: TrainRequest,
    pub respond_to: tokio::sync::mpsc::Sender<ResponseSignal>,
}

impl From<CommandRequest> for Task {
    fn from(request: CommandRequest) -> Self {
        Task {
            id: Uuid::new_v4(),
            owner: request.owner,
            request_id: request.request_id,
            command: request.command,
            respond_to: request.respond_to,
        }
    }
}

/// Wake-up and lifecycle signals. Commands themselves travel on an mpsc channel.
#[derive(Clone, Debug)]
pub enum InternalMessage {
    TaskAdded,
    GracefulStop,
    Stop,
}

/// Frames written back to a connection.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResponseSignal {
    Deferred { id: String },
    Reply { id: String, content: String },
    Error { message: String },
    #[serde(skip)]
    Stop,
}

impl fmt::Display for ResponseSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let ResponseSignal::Stop = self {
            return f.write_str("stop");
        }
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}
