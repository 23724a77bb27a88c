//! Local completion alert (the in-app chime)

use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    process::Command,
};
use tracing::{debug, info};

use crate::state::TimerCompletion;

/// Plays the local alert when a countdown reaches zero
#[derive(Debug, Clone, Default)]
pub struct CompletionAlert {
    /// Optional command run with the timer label as its only argument
    pub sound_command: Option<String>,
}

impl CompletionAlert {
    pub fn new(sound_command: Option<String>) -> Self {
        Self { sound_command }
    }

    /// Ring the terminal bell and run the sound command, if one is configured
    pub async fn play(&self, completion: &TimerCompletion) -> Result<(), String> {
        info!("Timer done: {} ({})", completion.step_key, completion.label);

        let mut stdout = tokio::io::stdout();
        ring_bell(&mut stdout)
            .await
            .map_err(|e| format!("Failed to ring terminal bell: {}", e))?;

        let Some(command) = &self.sound_command else {
            return Ok(());
        };

        debug!("Running alert command {} for {}", command, completion.step_key);
        let output = Command::new(command)
            .arg(&completion.label)
            .output()
            .await
            .map_err(|e| format!("Failed to execute alert command {}: {}", command, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("Alert command {} failed: {}", command, stderr));
        }

        Ok(())
    }
}

async fn ring_bell<W: AsyncWrite + Unpin>(out: &mut W) -> std::io::Result<()> {
    out.write_all(b"\x07").await?;
    out.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion() -> TimerCompletion {
        TimerCompletion {
            step_key: "step-2".to_string(),
            label: "Rest the dough".to_string(),
            total_seconds: 5,
            ended_at_ms: 5_000,
            detected_at_ms: 10_000,
        }
    }

    #[tokio::test]
    async fn bell_only_succeeds() {
        assert!(CompletionAlert::default().play(&completion()).await.is_ok());
    }

    #[tokio::test]
    async fn bell_is_written_without_blocking() {
        let mut out = Vec::new();
        ring_bell(&mut out).await.unwrap();
        assert_eq!(out, b"\x07");
    }

    #[tokio::test]
    async fn failing_sound_command_is_reported() {
        let alert = CompletionAlert::new(Some("false".to_string()));
        assert!(alert.play(&completion()).await.is_err());
    }
}
