#[cfg(feature = "audio")]
pub mod chime;

use std::sync::Arc;

use log::info;

use crate::settings::NotificationSettings;
use crate::timer::TimerMode;

/// Best-effort cue at a phase boundary. Callers log and drop any error.
pub trait Notifier: Send + Sync {
    fn notify(&self, finished: TimerMode) -> Result<(), String>;
}

/// Writes the boundary to the log instead of playing a sound.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, finished: TimerMode) -> Result<(), String> {
        info!("{} phase finished", finished.as_str());
        Ok(())
    }
}

/// Picks the chime player when audio support is compiled in and enabled.
pub fn notifier_for(settings: &NotificationSettings) -> Arc<dyn Notifier> {
    if !settings.enabled {
        return Arc::new(LogNotifier);
    }

    #[cfg(feature = "audio")]
    {
        let player = engine::ChimePlayer::new();
        if let Err(err) = player.set_volume(settings.volume) {
            log::warn!("Failed to set chime volume: {}", err);
        }
        Arc::new(player)
    }

    #[cfg(not(feature = "audio"))]
    {
        Arc::new(LogNotifier)
    }
}

#[cfg(feature = "audio")]
pub use engine::ChimePlayer;

#[cfg(feature = "audio")]
mod engine {
    use super::chime::Chime;
    use super::Notifier;
    use crate::timer::TimerMode;

    use log::warn;
    use rodio::{OutputStream, Sink};
    use std::sync::{
        mpsc::{self, Sender},
        Mutex,
    };
    use std::thread;

    enum AudioCommand {
        Play(TimerMode),
        SetVolume(f32),
    }

    /// Owns a dedicated audio thread; rodio output streams are not `Send`.
    pub struct ChimePlayer {
        tx: Mutex<Option<Sender<AudioCommand>>>,
        volume: Mutex<f32>,
    }

    impl ChimePlayer {
        pub fn new() -> Self {
            Self {
                tx: Mutex::new(None),
                volume: Mutex::new(0.5),
            }
        }

        fn ensure_thread(&self) -> Result<Sender<AudioCommand>, String> {
            let mut guard = self.tx.lock().map_err(|e| e.to_string())?;
            if let Some(tx) = guard.as_ref() {
                return Ok(tx.clone());
            }

            let (tx, rx) = mpsc::channel::<AudioCommand>();
            let initial_volume = *self.volume.lock().map_err(|e| e.to_string())?;

            thread::Builder::new()
                .name("chime-audio".to_string())
                .spawn(move || {
                    let mut _stream: Option<OutputStream> = None;
                    let mut sink: Option<Sink> = None;
                    let mut volume = initial_volume;

                    fn ensure_sink(
                        stream: &mut Option<OutputStream>,
                        sink: &mut Option<Sink>,
                    ) -> Result<(), String> {
                        if sink.is_none() {
                            let (s, handle) = OutputStream::try_default()
                                .map_err(|e| format!("Failed to create audio output stream: {}", e))?;
                            let new_sink = Sink::try_new(&handle)
                                .map_err(|e| format!("Failed to create audio sink: {}", e))?;
                            *stream = Some(s);
                            *sink = Some(new_sink);
                        }
                        Ok(())
                    }

                    while let Ok(cmd) = rx.recv() {
                        match cmd {
                            AudioCommand::Play(finished) => {
                                if let Err(err) = ensure_sink(&mut _stream, &mut sink) {
                                    warn!("Chime playback failed: {}", err);
                                    continue;
                                }
                                if let Some(ref s) = sink {
                                    s.set_volume(volume);
                                    s.append(Chime::for_finished(finished));
                                }
                            }
                            AudioCommand::SetVolume(v) => {
                                volume = v.clamp(0.0, 1.0);
                                if let Some(ref s) = sink {
                                    s.set_volume(volume);
                                }
                            }
                        }
                    }
                })
                .map_err(|e| e.to_string())?;

            *guard = Some(tx.clone());
            Ok(tx)
        }

        pub fn set_volume(&self, volume: f32) -> Result<(), String> {
            *self.volume.lock().map_err(|e| e.to_string())? = volume.clamp(0.0, 1.0);
            if let Some(tx) = self.tx.lock().map_err(|e| e.to_string())?.as_ref() {
                tx.send(AudioCommand::SetVolume(volume))
                    .map_err(|e| e.to_string())?;
            }
            Ok(())
        }
    }

    impl Default for ChimePlayer {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Notifier for ChimePlayer {
        fn notify(&self, finished: TimerMode) -> Result<(), String> {
            let tx = self.ensure_thread()?;
            tx.send(AudioCommand::Play(finished))
                .map_err(|e| e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_notifications_never_fail() {
        let settings = NotificationSettings {
            enabled: false,
            volume: 0.5,
        };
        let notifier = notifier_for(&settings);
        assert!(notifier.notify(TimerMode::Work).is_ok());
        assert!(notifier.notify(TimerMode::Break).is_ok());
    }
}
