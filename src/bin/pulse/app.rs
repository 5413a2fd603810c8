//! Pulse - playback app builder and runner

use std::io::BufRead;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Producer, RingBuffer};

use pulse_dsp::{
    io::{AudioOutput, WavDecoder},
    state::KitState,
    synth::message::MessageReceiver,
    DrumEngine, DrumEvent, EngineConfig, EngineHandle, MAX_BLOCK_SIZE, NUM_PARTS, PART_NAMES,
};

use super::sequencer::{Pattern, StepSequencer};

/// Events per block: sequencer hits plus whatever the prompt sent.
const EVENT_CAPACITY: usize = 64;

pub struct Pulse {
    bpm: f64,
    pattern: Pattern,
    kit: Option<PathBuf>,
}

impl Pulse {
    pub fn new(pattern: Pattern) -> Self {
        Self {
            bpm: 120.0,
            pattern,
            kit: None,
        }
    }

    pub fn bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    /// Kit JSON to restore before playback starts.
    pub fn kit(mut self, path: Option<PathBuf>) -> Self {
        self.kit = path;
        self
    }

    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let (mut engine, mut handle) = DrumEngine::new(EngineConfig {
            sample_rate,
            max_block_size: MAX_BLOCK_SIZE,
        });

        if let Some(path) = &self.kit {
            let state = KitState::load(path)
                .wrap_err_with(|| format!("failed to load kit {}", path.display()))?;
            handle.restore_state(&state, &WavDecoder);
            log::info!("restored kit from {}", path.display());
        }

        println!("=== Pulse ===");
        println!("BPM: {}", self.bpm);
        println!("Sample rate: {} Hz", sample_rate);
        println!("Channels: {}", channels);
        println!("Pattern hits: {}", self.pattern.hits());
        println!();
        print_help();

        let (tx, mut rx) = RingBuffer::<DrumEvent>::new(EVENT_CAPACITY);
        let mut sequencer = StepSequencer::new(self.pattern, self.bpm, f64::from(sample_rate));
        let mut events = Vec::with_capacity(EVENT_CAPACITY);
        let mut output = if channels == 1 {
            AudioOutput::mono(MAX_BLOCK_SIZE)
        } else {
            AudioOutput::stereo(MAX_BLOCK_SIZE)
        };

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);

                    events.clear();
                    sequencer.process_block(frames, &mut events);
                    while events.len() < events.capacity() {
                        match MessageReceiver::pop(&mut rx) {
                            Some(event) => events.push(event),
                            None => break,
                        }
                    }

                    output.resize(frames);
                    engine.process_block(&mut output, &events);

                    // Extra device channels repeat the last engine channel
                    let last = output.num_channels() - 1;
                    let out_off = frames_written * channels;
                    for i in 0..frames {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = output.buffers[ch.min(last)][i];
                        }
                    }

                    frames_written += frames;
                }
            },
            |err| log::error!("audio stream error: {err}"),
            None,
        )?;

        stream.play()?;

        control_loop(&mut handle, tx)?;
        drop(stream);
        Ok(())
    }
}

fn print_help() {
    println!("Commands:");
    for (part, name) in PART_NAMES.iter().enumerate() {
        println!("  {}            hit {name}", part + 1);
    }
    println!("  at <part> <p> aftertouch 0..1 on part 1-{NUM_PARTS}");
    println!("  set <id> <v>  set a parameter, e.g. set p1_syn_freq 48");
    println!("  load <part> <slot> <file.wav>");
    println!("  save <kit.json>");
    println!("  q             quit");
    println!();
}

/// Read commands from stdin until `q` or end of input.
fn control_loop(handle: &mut EngineHandle, mut tx: Producer<DrumEvent>) -> EyreResult<()> {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.wrap_err("failed to read stdin")?;
        let words: Vec<&str> = line.split_whitespace().collect();

        match words.as_slice() {
            [] => {}
            ["q"] | ["quit"] => break,
            [pad] if pad.parse::<usize>().is_ok() => {
                let part = pad.parse::<usize>().unwrap_or(0);
                if part == 0 || !handle.trigger(part - 1, 1.0) {
                    println!("no pad {pad}");
                }
            }
            ["at", part, pressure] => match (part.parse::<u8>(), pressure.parse::<f32>()) {
                (Ok(channel), Ok(pressure)) => {
                    let event = DrumEvent::ChannelPressure {
                        channel,
                        pressure: pressure.clamp(0.0, 1.0),
                    };
                    if tx.push(event).is_err() {
                        log::warn!("event queue full, pressure dropped");
                    }
                }
                _ => println!("usage: at <part> <pressure>"),
            },
            ["set", id, value] => {
                let applied = value
                    .parse::<f32>()
                    .is_ok_and(|v| handle.params().set_by_id(id, v));
                if !applied {
                    println!("unknown parameter or value: {id} {value}");
                }
            }
            ["load", part, slot, path] => match (part.parse::<usize>(), slot.parse::<usize>()) {
                (Ok(part), Ok(slot)) if part > 0 && slot > 0 => {
                    if let Err(err) =
                        handle.load_sample(part - 1, slot - 1, Path::new(path), &WavDecoder)
                    {
                        println!("load failed: {err}");
                    }
                }
                _ => println!("usage: load <part 1-4> <slot 1-2> <file.wav>"),
            },
            ["save", path] => {
                if let Err(err) = handle.save_state().save(Path::new(path)) {
                    println!("save failed: {err}");
                }
            }
            _ => print_help(),
        }
    }
    Ok(())
}
