//! Phase-change alarm.
//!
//! Playback is best-effort: callers log a failed alarm and carry on with the
//! transition.

use std::io::Write;

use crate::error::AlarmError;

/// Clip played at every phase change unless configured otherwise.
pub const DEFAULT_SOUND_URL: &str = "https://cdn.freesound.org/previews/22/22627_7037-lq.mp3";

pub trait Alarm: Send + Sync {
    fn play(&self) -> Result<(), AlarmError>;
}

/// Alarm that does nothing. Used when alarms are disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAlarm;

impl Alarm for SilentAlarm {
    fn play(&self) -> Result<(), AlarmError> {
        Ok(())
    }
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Clone)]
pub struct TerminalBell {
    sound_url: String,
}

impl TerminalBell {
    pub fn new(sound_url: impl Into<String>) -> Self {
        Self {
            sound_url: sound_url.into(),
        }
    }

    pub fn sound_url(&self) -> &str {
        &self.sound_url
    }
}

impl Default for TerminalBell {
    fn default() -> Self {
        Self::new(DEFAULT_SOUND_URL)
    }
}

impl Alarm for TerminalBell {
    fn play(&self) -> Result<(), AlarmError> {
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        tracing::debug!(sound_url = %self.sound_url, "alarm rung");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_alarm_never_fails() {
        assert!(SilentAlarm.play().is_ok());
    }

    #[test]
    fn terminal_bell_defaults_to_stock_clip() {
        assert_eq!(TerminalBell::default().sound_url(), DEFAULT_SOUND_URL);
    }
}
