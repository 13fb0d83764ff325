//! Real-time pull interface run inside the audio callback.

use std::fmt;
use std::str::FromStr;

use super::double_buffer::BufferReader;

/// How the mono frame is laid onto the interleaved stereo stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StereoMode {
    /// Successive frame samples alternate left and right
    #[default]
    Interleaved,
    /// Every frame sample is written to both channels
    Duplicated,
}

impl StereoMode {
    pub fn name(&self) -> &'static str {
        match self {
            StereoMode::Interleaved => "interleaved",
            StereoMode::Duplicated => "duplicated",
        }
    }

    /// Frame samples consumed per stereo output frame
    pub fn samples_per_frame(&self) -> usize {
        match self {
            StereoMode::Interleaved => 2,
            StereoMode::Duplicated => 1,
        }
    }

    /// Playback positions taken by one pass over a frame of `frame_len`.
    ///
    /// Interleaved passes always span whole stereo frames, so an odd frame
    /// repeats its last sample on the right channel.
    pub fn loop_len(&self, frame_len: usize) -> usize {
        match self {
            StereoMode::Interleaved => frame_len + frame_len % 2,
            StereoMode::Duplicated => frame_len,
        }
    }
}

/// Stereo frames a callback has consumed before tick `tick` (0-based)
/// publishes, rounded so the total never drifts from `sample_rate / fps`
/// per tick.
pub fn frames_before_tick(tick: u64, sample_rate_hz: u32, fps: u32) -> u64 {
    (tick * sample_rate_hz as u64 + fps as u64 / 2) / fps as u64
}

impl fmt::Display for StereoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StereoMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "interleaved" => Ok(StereoMode::Interleaved),
            "duplicated" | "mono" => Ok(StereoMode::Duplicated),
            other => Err(format!("unknown stereo mode '{}'", other)),
        }
    }
}

/// Streams the latest published frame on a loop.
///
/// Owns the read cursor and the channel phase; nothing else touches them.
/// `pull` never allocates and never blocks. Frame sample 0 always lands on
/// the left channel.
pub struct RealtimeFeed {
    reader: BufferReader,
    cursor: usize,
    /// The next output slot is a right channel
    right_pending: bool,
    mode: StereoMode,
}

impl RealtimeFeed {
    pub fn new(reader: BufferReader, mode: StereoMode) -> Self {
        Self {
            reader,
            cursor: 0,
            right_pending: false,
            mode,
        }
    }

    pub fn mode(&self) -> StereoMode {
        self.mode
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Fill `out` with interleaved stereo samples.
    ///
    /// Picks up a newly published frame first, keeping the cursor where it
    /// was, then walks the frame and wraps at its end.
    pub fn pull(&mut self, out: &mut [f32]) {
        self.reader.refresh();
        let len = self.reader.len();
        if len == 0 {
            out.fill(0.0);
            return;
        }

        match self.mode {
            StereoMode::Interleaved => {
                for slot in out.iter_mut() {
                    *slot = self.reader.sample(self.cursor);
                    // Odd frames end on a left slot; hold for the right one
                    let hold = !self.right_pending && len % 2 == 1 && self.cursor == len - 1;
                    if !hold {
                        self.cursor = (self.cursor + 1) % len;
                    }
                    self.right_pending = !self.right_pending;
                }
            }
            StereoMode::Duplicated => {
                for slot in out.iter_mut() {
                    *slot = self.reader.sample(self.cursor);
                    if self.right_pending {
                        self.cursor = (self.cursor + 1) % len;
                    }
                    self.right_pending = !self.right_pending;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioDoubleBuffer;

    fn ramp_feed(len: usize, mode: StereoMode) -> RealtimeFeed {
        let (mut writer, reader) = AudioDoubleBuffer::new(len);
        let frame: Vec<f32> = (0..len).map(|i| i as f32).collect();
        writer.publish(&frame).unwrap();
        RealtimeFeed::new(reader, mode)
    }

    #[test]
    fn test_interleaved_pulls_wrap() {
        let mut feed = ramp_feed(8, StereoMode::Interleaved);
        let mut out = [0.0f32; 4];

        feed.pull(&mut out);
        assert_eq!(out, [0.0, 1.0, 2.0, 3.0]);
        feed.pull(&mut out);
        assert_eq!(out, [4.0, 5.0, 6.0, 7.0]);
        feed.pull(&mut out);
        assert_eq!(out, [0.0, 1.0, 2.0, 3.0]);
        assert_eq!(feed.cursor(), 4);
    }

    #[test]
    fn test_pull_longer_than_frame() {
        let mut feed = ramp_feed(4, StereoMode::Interleaved);
        let mut out = [0.0f32; 7];
        feed.pull(&mut out);
        assert_eq!(out, [0.0, 1.0, 2.0, 3.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_odd_frame_keeps_channels_across_wraps() {
        let mut feed = ramp_feed(3, StereoMode::Interleaved);
        let mut out = [0.0f32; 7];
        feed.pull(&mut out);
        assert_eq!(out, [0.0, 1.0, 2.0, 2.0, 0.0, 1.0, 2.0]);

        // Split pulls pick up mid-stereo-frame and stay in phase
        let mut feed = ramp_feed(3, StereoMode::Interleaved);
        let mut stream = Vec::new();
        let mut chunk = [0.0f32; 3];
        for _ in 0..8 {
            feed.pull(&mut chunk);
            stream.extend_from_slice(&chunk);
        }
        let left: Vec<f32> = stream.iter().step_by(2).copied().collect();
        let right: Vec<f32> = stream.iter().skip(1).step_by(2).copied().collect();
        assert!(left.chunks(2).all(|pair| pair == [0.0, 2.0]));
        assert!(right.chunks(2).all(|pair| pair == [1.0, 2.0]));
        assert_eq!(StereoMode::Interleaved.loop_len(3), 4);
    }

    #[test]
    fn test_duplicated_writes_both_channels() {
        let mut feed = ramp_feed(3, StereoMode::Duplicated);
        let mut out = [0.0f32; 8];
        feed.pull(&mut out);
        assert_eq!(out, [0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_duplicated_phase_survives_odd_pulls() {
        let mut feed = ramp_feed(4, StereoMode::Duplicated);
        let mut first = [0.0f32; 3];
        let mut second = [0.0f32; 3];
        feed.pull(&mut first);
        feed.pull(&mut second);
        assert_eq!(first, [0.0, 0.0, 1.0]);
        assert_eq!(second, [1.0, 2.0, 2.0]);
    }

    #[test]
    fn test_cursor_kept_across_new_frames() {
        let (mut writer, reader) = AudioDoubleBuffer::new(4);
        writer.publish(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut feed = RealtimeFeed::new(reader, StereoMode::Interleaved);

        let mut out = [0.0f32; 2];
        feed.pull(&mut out);
        assert_eq!(out, [1.0, 2.0]);

        writer.publish(&[10.0, 20.0, 30.0, 40.0]).unwrap();
        feed.pull(&mut out);
        assert_eq!(out, [30.0, 40.0]);
    }

    #[test]
    fn test_silence_without_publish() {
        let (_writer, reader) = AudioDoubleBuffer::new(4);
        let mut feed = RealtimeFeed::new(reader, StereoMode::Interleaved);
        let mut out = [1.0f32; 6];
        feed.pull(&mut out);
        assert_eq!(out, [0.0; 6]);
    }

    #[test]
    fn test_frames_before_tick_never_drifts() {
        assert_eq!(frames_before_tick(0, 44100, 12), 0);
        // 44100 / 12 = 3675 exactly
        assert_eq!(frames_before_tick(1, 44100, 12), 3675);
        assert_eq!(frames_before_tick(12, 44100, 12), 44100);

        // 8000 / 3 is fractional; totals still land on whole seconds
        let per_tick: Vec<u64> = (0..3)
            .map(|t| frames_before_tick(t + 1, 8000, 3) - frames_before_tick(t, 8000, 3))
            .collect();
        assert_eq!(per_tick.iter().sum::<u64>(), 8000);
        assert!(per_tick.iter().all(|&n| n == 2666 || n == 2667));
    }

    #[test]
    fn test_parse_stereo_mode() {
        assert_eq!("Duplicated".parse::<StereoMode>(), Ok(StereoMode::Duplicated));
        assert_eq!("interleaved".parse::<StereoMode>(), Ok(StereoMode::Interleaved));
        assert!("quad".parse::<StereoMode>().is_err());
    }
}
