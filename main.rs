//! main.rs - Desktop simulator for the falling star/bean background
//! Handles the window, frame pacing, and keyboard input

use std::error::Error;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    text::{Baseline, Text},
};
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use bean_field::{Canvas, FrameLoop, ParticleField, Settings};

/// Deep-space page background.
const SPACE: Rgb888 = Rgb888::new(0x0b, 0x0d, 0x17);

/// Viewports cycled with `R`, standing in for browser window resizes.
const VIEWPORTS: [(u32, u32); 4] = [(800, 600), (400, 300), (1024, 480), (320, 170)];

#[derive(Parser, Debug)]
#[command(name = "bean-field", about = "Falling stars and coffee beans")]
struct Args {
    /// Initial viewport width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Initial viewport height in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Seed for the particle generator; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Target frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Window pixel scale
    #[arg(long, default_value_t = 1)]
    scale: u32,

    /// Share of particles drawn as beans
    #[arg(long)]
    beans: Option<f32>,

    /// Hide the status overlay
    #[arg(long)]
    quiet: bool,
}

struct Viewport {
    display: SimulatorDisplay<Rgb888>,
    window: Window,
}

impl Viewport {
    fn open(width: u32, height: u32, scale: u32) -> Self {
        let output_settings = OutputSettingsBuilder::new().scale(scale.max(1)).build();
        Self {
            display: SimulatorDisplay::new(Size::new(width, height)),
            window: Window::new("bean-field", &output_settings),
        }
    }
}

fn draw_overlay(
    display: &mut SimulatorDisplay<Rgb888>,
    frame_loop: &FrameLoop<SmallRng>,
) -> Result<(), Box<dyn Error>> {
    let style = MonoTextStyle::new(&FONT_6X10, Rgb888::new(0xff, 0x90, 0x68));
    let field = frame_loop.field();
    let (stars, beans) = field.census();
    let status = format!(
        "{}x{}  stars {}  beans {}{}",
        field.width(),
        field.height(),
        stars,
        beans,
        if frame_loop.is_paused() { "  [paused]" } else { "" },
    );
    Text::with_baseline(&status, Point::new(5, 5), style, Baseline::Top).draw(display)?;
    Ok(())
}

// CHANGE: Field state reported on stdout
// REASON: Simulator installs no log subscriber, same as the startup banner
fn report_field(frame_loop: &FrameLoop<SmallRng>) {
    let field = frame_loop.field();
    let (stars, beans) = field.census();
    println!(
        "Field: {}x{}, {} particles ({} stars, {} beans)",
        field.width(),
        field.height(),
        field.len(),
        stars,
        beans
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut settings = Settings::default();
    if let Some(beans) = args.beans {
        settings.bean_chance = beans;
    }

    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });

    let field: ParticleField<SmallRng> =
        ParticleField::with_settings(args.width, args.height, SmallRng::seed_from_u64(seed), settings)?;
    let mut frame_loop = FrameLoop::new(field);
    let mut viewport = Viewport::open(args.width, args.height, args.scale);
    let mut preset = 0usize;

    let frame_duration = Duration::from_secs_f32(1.0 / args.fps.max(1) as f32);

    println!("=== bean-field ===");
    println!("Seed: {}", seed);
    println!("Controls:");
    println!("  Space: Pause / resume");
    println!("  R: Cycle viewport size");
    println!("  Q: Quit");
    report_field(&frame_loop);

    'main_loop: loop {
        let now = Instant::now();

        // CHANGE: Window is reopened at the frame boundary
        // REASON: Field rebuild is deferred to the same point
        let resizing = frame_loop.has_pending_resize();
        if resizing {
            let (w, h) = VIEWPORTS[preset];
            viewport = Viewport::open(w, h, args.scale);
        }

        {
            let mut canvas = Canvas::new(&mut viewport.display, SPACE);
            frame_loop.frame(&mut canvas)?;
        }
        if resizing {
            report_field(&frame_loop);
        }
        if !args.quiet {
            draw_overlay(&mut viewport.display, &frame_loop)?;
        }
        viewport.window.update(&viewport.display);

        for event in viewport.window.events() {
            match event {
                SimulatorEvent::Quit => break 'main_loop,
                SimulatorEvent::KeyDown { keycode, .. } => {
                    let key = format!("{:?}", keycode).to_lowercase();
                    match key.as_str() {
                        "space" => {
                            let paused = frame_loop.toggle_pause();
                            println!("Paused: {}", if paused { "ON" } else { "OFF" });
                        }
                        "r" => {
                            preset = (preset + 1) % VIEWPORTS.len();
                            let (w, h) = VIEWPORTS[preset];
                            frame_loop.request_resize(w, h);
                            println!("Viewport requested: {}x{}", w, h);
                        }
                        "q" => break 'main_loop,
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        let elapsed = now.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
    }

    println!("{} frames drawn", frame_loop.frames());
    Ok(())
}
