// What you SEE:
// • A still photo of a candle whose flame licks and whose light flickers.
// • --breakdown cycles every 3 s through the layers that build the effect,
//   captioned in the bottom-left corner.
// • Resize the window freely; the frame keeps the photo's aspect. ESC quits.
// • --snapshot renders one frame to a PNG instead of opening a window.

use candlelight::animation::{AnimationClock, Animator};
use candlelight::config::Config;
use candlelight::draw::{draw_stage_caption, draw_text_5x7, Drawer};
use candlelight::error::Error;
use candlelight::export;
use candlelight::noise_field::NoiseField;
use candlelight::render::{render, render_into, Surface};
use candlelight::stages::{validate_presets, EffectStepper, StepMode, STAGES};
use candlelight::texture::TextureSet;
use candlelight::types::FrameBuffer;
use clap::Parser;
use std::time::{Duration, Instant};
use tracing::{debug, info};

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cfg = Config::parse();
    cfg.validate()?;
    validate_presets(&STAGES)?;

    /* --- Read-only inputs ---
       Visual: a missing file shows up as a black photo or an empty mask,
       the other layers still animate. */
    let textures = TextureSet::load(&cfg.assets);
    let noise = NoiseField::new(cfg.seed);
    let stepper = EffectStepper::new(cfg.step_mode(), cfg.step_interval());

    if let Some(path) = &cfg.snapshot {
        let stage_index = cfg.stage.unwrap_or(stepper.index());
        let surface = Surface::from_width(cfg.width, cfg.aspect)
            .ok_or_else(|| Error::Config("surface has no area".into()))?;
        let frame = render(cfg.tick, &STAGES[stage_index], surface, &textures, &noise);
        return export::save_frame(&frame, path);
    }

    run_window(&cfg, &textures, &noise, stepper)
}

/// The host loop: one render per display refresh until the window closes.
fn run_window(cfg: &Config, textures: &TextureSet, noise: &NoiseField, stepper: EffectStepper) -> Result<(), Error> {
    let initial = Surface::from_width(cfg.width, cfg.aspect)
        .ok_or_else(|| Error::Config("surface has no area".into()))?;
    let title = match cfg.step_mode() {
        StepMode::Breakdown => "Candlelight: breakdown",
        StepMode::Static => "Candlelight",
    };
    let mut drawer = Drawer::new(title, initial.width, initial.height)?;
    info!(mode = ?cfg.step_mode(), width = initial.width, height = initial.height, assets = %cfg.assets.display(), "window open");

    // The animator is the only writer of the animation state; dropping it
    // on any exit path below cancels the stage timer.
    let mut animator = Animator::new(AnimationClock::new(cfg.target_rate)?, stepper);
    let mut screen = FrameBuffer::new(initial.width, initial.height);

    /* --- HUD / FPS --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");

    let origin = Instant::now();

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Advance time (and, in breakdown mode, maybe the stage). */
        let (state, preset) = animator.frame(origin.elapsed());

        /* 2) Size the surface from the measured width.
           Visual: nothing is drawn while the window has no width (minimized). */
        let Some(surface) = Surface::from_width(drawer.measured_width(), cfg.aspect) else {
            drawer.pump();
            continue;
        };

        /* 3) Shade every pixel for this tick and stage. */
        render_into(&mut screen, state.tick, preset, surface, textures, noise);

        /* 4) Captions on top. */
        if animator.mode() == StepMode::Breakdown {
            draw_stage_caption(&mut screen, preset.name);
        }
        if cfg.hud {
            draw_text_5x7(&mut screen, 8, 8, &hud_fps_text, 0x00_FF_FF_FF);
        }

        /* 5) Present to the window. */
        drawer.present(&screen)?;

        /* 6) FPS counter (debug log + optional HUD once per second) */
        frames_this_second += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            debug!(fps, tick = state.tick, "frame rate");
            hud_fps_text = format!("FPS: {:.1}", fps);
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    animator.stop();
    info!(tick = animator.state().tick, "window closed");
    Ok(())
}
