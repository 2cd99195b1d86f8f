/// Sound cues: short procedural tones played through rodio.
///
/// Every cue is synthesized into an in-memory WAV once at startup and
/// played fire-and-forget, so the frame loop never blocks on audio.
///
/// Build without the "sound" feature to drop rodio; the stub
/// `SoundEngine` then accepts the same calls and does nothing.

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::PI;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_found: Arc<Vec<u8>>,
        sfx_stage: Arc<Vec<u8>>,
        sfx_freeze: Arc<Vec<u8>>,
        sfx_unlock: Arc<Vec<u8>>,
        sfx_correct: Arc<Vec<u8>>,
        sfx_wrong: Arc<Vec<u8>>,
        sfx_success: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_found: Arc::new(make_wav(&gen_found())),
                sfx_stage: Arc::new(make_wav(&gen_stage())),
                sfx_freeze: Arc::new(make_wav(&gen_freeze())),
                sfx_unlock: Arc::new(make_wav(&gen_unlock())),
                sfx_correct: Arc::new(make_wav(&gen_correct())),
                sfx_wrong: Arc::new(make_wav(&gen_wrong())),
                sfx_success: Arc::new(make_wav(&gen_success())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        pub fn play_found(&self) { self.play(&self.sfx_found); }
        pub fn play_stage_complete(&self) { self.play(&self.sfx_stage); }
        pub fn play_freeze(&self) { self.play(&self.sfx_freeze); }
        pub fn play_unlock(&self) { self.play(&self.sfx_unlock); }
        pub fn play_correct(&self) { self.play(&self.sfx_correct); }
        pub fn play_wrong(&self) { self.play(&self.sfx_wrong); }
        pub fn play_success(&self) { self.play(&self.sfx_success); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: mono f32 samples
    // ════════════════════════════════════════════════════════════

    /// Notes played back to back. `bright` mixes in the octave for a
    /// chime-like timbre; `decay` shapes each note's fade.
    fn notes(seq: &[(f32, f32)], bright: bool, decay: f32, volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in seq {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(decay);
                let mut wave = (t * freq * 2.0 * PI).sin();
                if bright {
                    wave = wave * 0.7 + (t * freq * 2.0 * 2.0 * PI).sin() * 0.3;
                }
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Treasure found: two quick rising notes (E6, A6)
    fn gen_found() -> Vec<f32> {
        notes(&[(1319.0, 0.05), (1760.0, 0.09)], true, 0.5, 0.25)
    }

    /// Stage one cleared: C5 E5 G5 C6 arpeggio with a held top note
    fn gen_stage() -> Vec<f32> {
        notes(
            &[(523.0, 0.09), (659.0, 0.09), (784.0, 0.09), (1047.0, 0.3)],
            true, 1.5, 0.3,
        )
    }

    /// Wrong guess: low buzzing drop that marks the freeze
    fn gen_freeze() -> Vec<f32> {
        let duration = 0.35;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 220.0 - t * 110.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                // Square wave for the buzz
                let wave = if (ti * freq * 2.0 * PI).sin() >= 0.0 { 1.0 } else { -1.0 };
                wave * (1.0 - t).powf(0.7) * 0.15
            })
            .collect()
    }

    /// Secret unlock: fast upward sweep
    fn gen_unlock() -> Vec<f32> {
        let duration = 0.18;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 400.0 + t * 1200.0;
                phase += freq / SAMPLE_RATE as f32;
                (phase * 2.0 * PI).sin() * (1.0 - t) * 0.25
            })
            .collect()
    }

    /// Correct answer: G5 → C6
    fn gen_correct() -> Vec<f32> {
        notes(&[(784.0, 0.07), (1047.0, 0.14)], true, 0.5, 0.3)
    }

    /// Wrong answer: A4 F#4 Eb4 C4 descending
    fn gen_wrong() -> Vec<f32> {
        notes(
            &[(440.0, 0.12), (370.0, 0.12), (311.0, 0.12), (261.0, 0.24)],
            false, 2.0, 0.3,
        )
    }

    /// All questions right: longer fanfare
    fn gen_success() -> Vec<f32> {
        notes(
            &[
                (523.0, 0.1), (659.0, 0.1), (784.0, 0.1),
                (659.0, 0.1), (784.0, 0.1), (1047.0, 0.45),
            ],
            true, 1.5, 0.3,
        )
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: 16-bit PCM mono
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_describes_payload() {
            let wav = make_wav(&gen_correct());
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
            assert_eq!(wav.len(), 44 + data_size as usize);
        }

        #[test]
        fn cues_stay_in_range() {
            for cue in [gen_found(), gen_freeze(), gen_unlock(), gen_wrong(), gen_success()] {
                assert!(!cue.is_empty());
                assert!(cue.iter().all(|s| s.abs() <= 1.0));
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: no-ops when the sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_found(&self) {}
    pub fn play_stage_complete(&self) {}
    pub fn play_freeze(&self) {}
    pub fn play_unlock(&self) {}
    pub fn play_correct(&self) {}
    pub fn play_wrong(&self) {}
    pub fn play_success(&self) {}
}
