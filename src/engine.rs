//! Tick context: one network pass, one visual frame and one audio frame per tick.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

use crate::audio::{frames_before_tick, BufferWriter};
use crate::controls::{Command, CommandQueue};
use crate::error::{Result, SynthError};
use crate::field::{fill_serpentine_coordinates, unsnake_into, GridShape, GridView};
use crate::harmonic::build_templates;
use crate::network::Network;
use crate::overlay::{Melody, Percussion};
use crate::params::Settings;
use crate::spectral::SpectralPipeline;

/// Everything the fixed-rate tick owns.
///
/// The audio callback only ever sees the frames published through the
/// writer; all other state stays on the tick side.
pub struct Kaleidosynth {
    shape: GridShape,
    network: Network,
    rng: StdRng,
    init_sigma: f32,
    /// `t` advance per tick
    time_step: f32,
    pipeline: SpectralPipeline,
    writer: BufferWriter,
    /// Raster-order copy of the latest field
    visual: Vec<f32>,
    melody: Melody,
    percussion: Percussion,
    sample_rate_hz: u32,
    fps: u32,
    samples_per_frame: u64,
    commands: CommandQueue,
    ticks: u64,
}

impl Kaleidosynth {
    /// Build the network, template bank and overlays for `settings`.
    ///
    /// `writer` must hand off frames of exactly one field's sample count.
    pub fn new(settings: &Settings, writer: BufferWriter) -> Result<Self> {
        settings.validate()?;

        let field = &settings.field;
        let shape = GridShape::from(field);
        let frame_len = field.sample_count();
        if writer.len() != frame_len {
            return Err(SynthError::FieldLength {
                expected: frame_len,
                actual: writer.len(),
            });
        }

        let widths = settings.network.layer_widths(field.channels);
        let mut network = Network::new(field.pixel_count(), &widths, settings.network.activation)?;
        let mut rng = match settings.network.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        network.seed(&mut rng, settings.network.init_sigma);

        let sample_rate = settings.audio.sample_rate_hz as f32;
        let bank = build_templates(
            &settings.harmonic.note_frequencies(),
            sample_rate,
            frame_len,
            &settings.harmonic,
        )?;
        let melody_bins = bank.iter().map(|t| t.base_bin()).collect();
        let pipeline = SpectralPipeline::new(frame_len, bank, settings.spectral.clone())?;

        let melody = Melody::new(&settings.overlay, melody_bins);
        let stereo = settings.audio.stereo;
        let samples_per_frame = stereo.samples_per_frame() as u64;
        let playback_rate = sample_rate * samples_per_frame as f32;
        let percussion = Percussion::new(&settings.overlay, playback_rate, stereo.loop_len(frame_len));

        log::info!(
            "Field {}x{}x{} @ {} fps, layers {:?} ({}), key {}",
            field.width,
            field.height,
            field.channels,
            field.fps,
            widths,
            settings.network.activation,
            settings.harmonic.key
        );

        Ok(Self {
            shape,
            network,
            rng,
            init_sigma: settings.network.init_sigma,
            time_step: 1.0 / (field.fps as f32 * settings.network.time_period_s),
            pipeline,
            writer,
            visual: vec![0.0; frame_len],
            melody,
            percussion,
            sample_rate_hz: settings.audio.sample_rate_hz,
            fps: field.fps,
            samples_per_frame,
            commands: CommandQueue::new(),
            ticks: 0,
        })
    }

    /// Frame samples the audio callback has consumed when this tick's
    /// frame is published
    fn playhead(&self) -> u64 {
        frames_before_tick(self.ticks, self.sample_rate_hz, self.fps) * self.samples_per_frame
    }

    /// Queue a command for the next tick boundary.
    pub fn push_command(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Advance one tick: apply queued commands, evaluate the field, publish
    /// the resynthesised audio frame and refresh the visual copy.
    pub fn tick(&mut self) -> Result<()> {
        let started = Instant::now();

        while let Some(command) = self.commands.pop() {
            if let Err(e) = self.apply(command) {
                log::warn!("Ignoring '{}': {}", command, e);
            }
        }

        let t = self.ticks as f32 * self.time_step;
        fill_serpentine_coordinates(self.network.input_mut(), self.shape, t)?;
        self.network.forward()?;

        // The visual copy comes from the activations before resynthesis
        // overwrites them. The output matrix (pixels x channels) is read
        // flat, so it is also the serpentine audio signal.
        unsnake_into(self.network.output().as_slice(), &mut self.visual, self.shape)?;

        self.pipeline.forward(self.network.output().as_slice())?;
        self.pipeline.apply_mask();
        self.melody.apply(self.pipeline.spectrum_mut());
        let playhead = self.playhead();
        let signal = self.network.output_mut().as_mut_slice();
        self.pipeline.inverse_normalized(signal)?;
        self.percussion.mix(signal, playhead);
        self.writer.publish(signal)?;

        self.ticks += 1;
        log::trace!("Tick {} took {:?}", self.ticks, started.elapsed());
        Ok(())
    }

    fn apply(&mut self, command: Command) -> Result<()> {
        match command {
            Command::SelectTemplate(index) => {
                self.pipeline.select_template(index)?;
                log::info!(
                    "Template {} ({:.1} Hz)",
                    index,
                    self.pipeline.bank().get(index)?.fundamental_hz()
                );
            }
            Command::ClearTemplate => {
                self.pipeline.clear_template();
                log::info!("Template cleared");
            }
            Command::Reseed => {
                self.reseed();
                log::info!("Network reseeded");
            }
            Command::ToggleMelody => {
                let on = self.melody.toggle();
                log::info!("Melody {}", if on { "on" } else { "off" });
            }
            Command::TogglePercussion => {
                let on = self.percussion.toggle();
                log::info!("Percussion {}", if on { "on" } else { "off" });
            }
        }
        Ok(())
    }

    /// Redraw every weight and bias from the engine's RNG.
    pub fn reseed(&mut self) {
        self.network.seed(&mut self.rng, self.init_sigma);
    }

    /// Latest field in raster order
    pub fn visual_field(&self) -> Result<GridView<'_>> {
        GridView::new(&self.visual, self.shape)
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn selected_template(&self) -> Option<usize> {
        self.pipeline.selected()
    }

    pub fn template_count(&self) -> usize {
        self.pipeline.bank().len()
    }

    pub fn melody_enabled(&self) -> bool {
        self.melody.is_enabled()
    }

    pub fn percussion_enabled(&self) -> bool {
        self.percussion.is_enabled()
    }

    pub fn network(&self) -> &Network {
        &self.network
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioDoubleBuffer, BufferReader};

    fn small_settings() -> Settings {
        let mut settings = Settings::default();
        settings.field.width = 16;
        settings.field.height = 12;
        settings.network.hidden_layers = vec![8];
        settings.network.seed = Some(5);
        settings.audio.sample_rate_hz = 8000;
        settings.harmonic.octave = 5;
        settings
    }

    fn engine(settings: &Settings) -> (Kaleidosynth, BufferReader) {
        let (writer, reader) = AudioDoubleBuffer::new(settings.field.sample_count());
        (Kaleidosynth::new(settings, writer).unwrap(), reader)
    }

    fn frame(reader: &BufferReader) -> Vec<f32> {
        (0..reader.len()).map(|i| reader.sample(i)).collect()
    }

    #[test]
    fn test_tick_publishes_resynthesised_field() {
        let settings = small_settings();
        let (mut synth, mut reader) = engine(&settings);
        synth.tick().unwrap();
        assert_eq!(synth.ticks(), 1);
        assert!(reader.refresh());

        // No template selected: the published frame is the field itself in
        // serpentine order, which unsnakes back to the visual copy
        let published = frame(&reader);
        let mut raster = vec![0.0; published.len()];
        unsnake_into(&published, &mut raster, synth.shape()).unwrap();
        let visual = synth.visual_field().unwrap();
        for (a, b) in raster.iter().zip(visual.as_slice()) {
            assert!((a - b).abs() < 1e-4, "{a} vs {b}");
        }
        // Sigmoid output
        assert!(visual.as_slice().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_commands_apply_at_tick_boundary() {
        let (mut synth, _reader) = engine(&small_settings());
        synth.push_command(Command::SelectTemplate(2));
        synth.push_command(Command::ToggleMelody);
        assert_eq!(synth.selected_template(), None);

        synth.tick().unwrap();
        assert_eq!(synth.selected_template(), Some(2));
        assert!(synth.melody_enabled());

        synth.push_command(Command::ClearTemplate);
        synth.tick().unwrap();
        assert_eq!(synth.selected_template(), None);
    }

    #[test]
    fn test_bad_template_keeps_selection_and_ticks_on() {
        let (mut synth, _reader) = engine(&small_settings());
        synth.push_command(Command::SelectTemplate(1));
        synth.tick().unwrap();
        synth.push_command(Command::SelectTemplate(42));
        synth.tick().unwrap();
        assert_eq!(synth.selected_template(), Some(1));
        assert_eq!(synth.ticks(), 2);
    }

    #[test]
    fn test_reseed_changes_weights() {
        let (mut synth, _reader) = engine(&small_settings());
        let before = synth.network().layers()[1].weights.clone();
        synth.push_command(Command::Reseed);
        synth.tick().unwrap();
        assert_ne!(synth.network().layers()[1].weights, before);
    }

    #[test]
    fn test_playhead_follows_callback_consumption() {
        let mut settings = small_settings();
        settings.field.fps = 4;
        let (mut synth, _reader) = engine(&settings);
        assert_eq!(synth.playhead(), 0);
        synth.tick().unwrap();
        // 8000 Hz / 4 fps, two frame samples per stereo frame
        assert_eq!(synth.playhead(), 4000);

        settings.audio.stereo = crate::audio::StereoMode::Duplicated;
        let (mut synth, _reader) = engine(&settings);
        synth.tick().unwrap();
        synth.tick().unwrap();
        assert_eq!(synth.playhead(), 4000);
    }

    #[test]
    fn test_same_seed_same_field() {
        let settings = small_settings();
        let (mut a, _ra) = engine(&settings);
        let (mut b, _rb) = engine(&settings);
        a.tick().unwrap();
        b.tick().unwrap();
        assert_eq!(
            a.visual_field().unwrap().as_slice(),
            b.visual_field().unwrap().as_slice()
        );
    }

    #[test]
    fn test_writer_length_must_match_field() {
        let settings = small_settings();
        let (writer, _reader) = AudioDoubleBuffer::new(10);
        assert!(matches!(
            Kaleidosynth::new(&settings, writer),
            Err(SynthError::FieldLength { .. })
        ));
    }
}
