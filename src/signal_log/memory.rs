use super::SignalLog;
use crate::validator::types::Signal;
use crate::Result;
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemorySignalLog {
    entries: Mutex<Vec<(String, Signal)>>,
}

impl InMemorySignalLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SignalLog for InMemorySignalLog {
    async fn append(&self, entity_id: &str, signal: &Signal) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| crate::Error::storage("signal log mutex poisoned"))?
            .push((entity_id.to_string(), signal.clone()));
        Ok(())
    }

    async fn replay(&self, entity_id: &str, pass_number: u8) -> Result<Vec<Signal>> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| crate::Error::storage("signal log mutex poisoned"))?;
        Ok(guard
            .iter()
            .filter(|(e, s)| e == entity_id && s.pass_number == pass_number)
            .map(|(_, s)| s.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Decision, ModelTier};
    use crate::validator::types::SaturationFlags;

    fn signal(pass_number: u8) -> Signal {
        Signal::new(
            "e", "h", Decision::Accept, "r", 0.06, 1.0, 0.06, 0.20, 0.26,
            SaturationFlags::default(), ModelTier::Small, pass_number, "hash", "https://example.com",
        )
    }

    #[tokio::test]
    async fn replay_filters_by_entity_and_pass() {
        let log = InMemorySignalLog::new();
        log.append("arsenal-fc", &signal(1)).await.unwrap();
        log.append("arsenal-fc", &signal(2)).await.unwrap();
        log.append("chelsea-fc", &signal(1)).await.unwrap();

        let replayed = log.replay("arsenal-fc", 1).await.unwrap();
        assert_eq!(replayed.len(), 1);
    }
}
