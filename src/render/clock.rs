use serde::Deserialize;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Play,
    Pause,
    Seeked,
}

impl PlaybackEvent {
    /// Events after which playback time may have jumped.
    pub fn is_discontinuity(self) -> bool {
        matches!(self, PlaybackEvent::Play | PlaybackEvent::Seeked)
    }
}

/// Where the renderer reads playback time from.
pub trait TimeSource {
    fn current_time_ms(&self) -> i64;

    fn duration_ms(&self) -> Option<i64>;

    /// Next pending play/pause/seek notification, oldest first.
    fn poll_event(&mut self) -> Option<PlaybackEvent>;
}

impl<T: TimeSource + ?Sized> TimeSource for Box<T> {
    fn current_time_ms(&self) -> i64 {
        (**self).current_time_ms()
    }

    fn duration_ms(&self) -> Option<i64> {
        (**self).duration_ms()
    }

    fn poll_event(&mut self) -> Option<PlaybackEvent> {
        (**self).poll_event()
    }
}

/// A video element on the page, driven by its host.
#[derive(Debug, Clone, Default)]
pub struct VideoClock {
    time_ms: i64,
    duration_ms: Option<i64>,
    playing: bool,
    events: VecDeque<PlaybackEvent>,
}

impl VideoClock {
    pub fn new(duration_ms: Option<i64>) -> Self {
        Self {
            duration_ms,
            ..Self::default()
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = true;
        self.events.push_back(PlaybackEvent::Play);
    }

    pub fn pause(&mut self) {
        self.playing = false;
        self.events.push_back(PlaybackEvent::Pause);
    }

    pub fn seek(&mut self, time_ms: i64) {
        self.time_ms = self.clamp(time_ms);
        self.events.push_back(PlaybackEvent::Seeked);
    }

    /// Normal playback progress; no event fires.
    pub fn advance(&mut self, delta_ms: i64) {
        if self.playing {
            self.time_ms = self.clamp(self.time_ms + delta_ms);
        }
    }

    fn clamp(&self, t: i64) -> i64 {
        match self.duration_ms {
            Some(d) => t.clamp(0, d),
            None => t.max(0),
        }
    }
}

impl TimeSource for VideoClock {
    fn current_time_ms(&self) -> i64 {
        self.time_ms
    }

    fn duration_ms(&self) -> Option<i64> {
        self.duration_ms
    }

    fn poll_event(&mut self) -> Option<PlaybackEvent> {
        self.events.pop_front()
    }
}

/// Message forwarded from a player living in a cross-origin iframe.
/// Times are in seconds, as the player reports them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProxyMessage {
    CurrentTime { time: f64 },
    Duration { duration: f64 },
    Play,
    Pause,
    Seeked { time: f64 },
}

/// Time source for players that can only be reached through messages.
#[derive(Debug, Clone, Default)]
pub struct ProxyClock {
    time_ms: i64,
    duration_ms: Option<i64>,
    events: VecDeque<PlaybackEvent>,
}

fn seconds_to_ms(s: f64) -> i64 {
    (s * 1000.0).round() as i64
}

impl ProxyClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, message: ProxyMessage) {
        match message {
            ProxyMessage::CurrentTime { time } => self.time_ms = seconds_to_ms(time),
            ProxyMessage::Duration { duration } => self.duration_ms = Some(seconds_to_ms(duration)),
            ProxyMessage::Play => self.events.push_back(PlaybackEvent::Play),
            ProxyMessage::Pause => self.events.push_back(PlaybackEvent::Pause),
            ProxyMessage::Seeked { time } => {
                self.time_ms = seconds_to_ms(time);
                self.events.push_back(PlaybackEvent::Seeked);
            }
        }
    }

    /// Accepts the raw JSON payload of a forwarded message.
    pub fn post_json(&mut self, raw: &str) -> Result<(), serde_json::Error> {
        let message: ProxyMessage = serde_json::from_str(raw)?;
        self.post(message);
        Ok(())
    }
}

impl TimeSource for ProxyClock {
    fn current_time_ms(&self) -> i64 {
        self.time_ms
    }

    fn duration_ms(&self) -> Option<i64> {
        self.duration_ms
    }

    fn poll_event(&mut self) -> Option<PlaybackEvent> {
        self.events.pop_front()
    }
}
