use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::actor::model::InternalMessage;

pub const SIGNAL_TOPIC: &str = "signal";

const TOPIC_CAPACITY: usize = 100;

#[derive(Clone, Debug)]
pub struct Topic {
    pub name: String,
    pub sender: tokio::sync::broadcast::Sender<InternalMessage>,
}

impl Topic {
    fn new(name: String) -> Self {
        let (sender, _) = tokio::sync::broadcast::channel(TOPIC_CAPACITY);
        Topic { name, sender }
    }

    pub fn publish(
        &self,
        message: InternalMessage,
    ) -> Result<usize, tokio::sync::broadcast::error::SendError<InternalMessage>> {
        self.sender.send(message)
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<InternalMessage> {
        self.sender.subscribe()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Broker {
    topics: Arc<Mutex<HashMap<String, Topic>>>,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn topic(&self, name: &str) -> Topic {
        self.topics
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_insert_with(|| Topic::new(name.to_string()))
            .clone()
    }

    pub fn subscribe(&self, name: &str) -> tokio::sync::broadcast::Receiver<InternalMessage> {
        self.topic(name).subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_topic_is_shared_between_handles() {
        let broker = Broker::new();
        let mut rx = broker.subscribe(SIGNAL_TOPIC);

        let clone = broker.clone();
        clone.topic(SIGNAL_TOPIC).publish(InternalMessage::TaskAdded).unwrap();

        assert!(matches!(rx.recv().await, Ok(InternalMessage::TaskAdded)));
    }

    #[test]
    fn test_publish_without_subscribers_fails() {
        let broker = Broker::new();
        assert!(broker.topic("empty").publish(InternalMessage::Stop).is_err());
    }
}
