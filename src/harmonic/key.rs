//! Musical keys and equal-tempered note frequencies.

use std::fmt;
use std::str::FromStr;

/// Concert pitch reference (A4)
pub const A4_HZ: f32 = 440.0;
const A4_MIDI: i32 = 69;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    #[default]
    Major,
    Minor,
    Pentatonic,
    Chromatic,
}

impl Scale {
    /// Semitone offsets from the root within one octave
    pub fn intervals(self) -> &'static [i32] {
        match self {
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::Minor => &[0, 2, 3, 5, 7, 8, 10],
            Scale::Pentatonic => &[0, 2, 4, 7, 9],
            Scale::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        }
    }
}

impl FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "major" | "maj" => Ok(Scale::Major),
            "minor" | "min" => Ok(Scale::Minor),
            "pentatonic" | "penta" => Ok(Scale::Pentatonic),
            "chromatic" => Ok(Scale::Chromatic),
            other => Err(format!("unknown scale '{}'", other)),
        }
    }
}

/// Root pitch class (0 = C … 11 = B) plus a scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Key {
    root: u8,
    scale: Scale,
}

impl Key {
    /// `root` is reduced to a pitch class, so 14 is D.
    pub fn new(root: u8, scale: Scale) -> Self {
        Self {
            root: root % 12,
            scale,
        }
    }

    pub fn root(&self) -> u8 {
        self.root
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Frequencies of the key's notes in `octave` (scientific pitch notation,
    /// so octave 4 starts at middle C).
    pub fn note_frequencies(&self, octave: i32) -> Vec<f32> {
        self.scale
            .intervals()
            .iter()
            .map(|&interval| {
                let midi = 12 * (octave + 1) + self.root as i32 + interval;
                midi_to_hz(midi)
            })
            .collect()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", NOTE_NAMES[self.root as usize], self.scale)
    }
}

pub fn midi_to_hz(midi: i32) -> f32 {
    A4_HZ * 2f32.powf((midi - A4_MIDI) as f32 / 12.0)
}

/// Parse a pitch class like `C`, `f#`, `Bb`
pub fn parse_pitch_class(name: &str) -> Result<u8, String> {
    let mut chars = name.trim().chars();
    let letter = chars
        .next()
        .ok_or_else(|| "empty note name".to_string())?
        .to_ascii_uppercase();
    let base: i32 = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return Err(format!("unknown note name '{}'", name)),
    };
    let accidental: i32 = match chars.as_str() {
        "" => 0,
        "#" | "s" => 1,
        "b" => -1,
        _ => return Err(format!("unknown accidental in '{}'", name)),
    };
    Ok((base + accidental).rem_euclid(12) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_midi_reference_pitches() {
        assert_relative_eq!(midi_to_hz(69), 440.0);
        assert_relative_eq!(midi_to_hz(81), 880.0, max_relative = 1e-6);
        assert_relative_eq!(midi_to_hz(60), 261.6256, max_relative = 1e-5);
    }

    #[test]
    fn test_a_major_starts_on_a4() {
        let key = Key::new(9, Scale::Major);
        let freqs = key.note_frequencies(4);
        assert_eq!(freqs.len(), 7);
        assert_relative_eq!(freqs[0], 440.0);
        assert!(freqs.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_root_wraps_to_pitch_class() {
        let key = Key::new(14, Scale::Minor);
        assert_eq!(key.root(), 2);
        assert_eq!(key.scale(), Scale::Minor);
        assert_eq!(key.to_string(), "D Minor");
        assert_eq!(Key::new(255, Scale::Major).to_string(), "D# Major");
        assert_eq!(Key::default().to_string(), "C Major");
    }

    #[test]
    fn test_scale_sizes() {
        assert_eq!(Key::new(0, Scale::Pentatonic).note_frequencies(3).len(), 5);
        assert_eq!(Key::new(0, Scale::Chromatic).note_frequencies(3).len(), 12);
    }

    #[test]
    fn test_parse_pitch_class() {
        assert_eq!(parse_pitch_class("C"), Ok(0));
        assert_eq!(parse_pitch_class("f#"), Ok(6));
        assert_eq!(parse_pitch_class("Bb"), Ok(10));
        assert_eq!(parse_pitch_class("Cb"), Ok(11));
        assert!(parse_pitch_class("H").is_err());
        assert!(parse_pitch_class("C##").is_err());
    }
}
