//! NES emulator entry point.
//!
//! Loads a cartridge and runs it in a window, or headless for a fixed number of frames.
//! Usage: nescore <path/to/game.nes> [--frames N]

use std::cell::Cell;
use std::env;
use std::process;
use std::rc::Rc;

use ansi_term::Colour::{Green, Red};
use minifb::{Key, Scale, ScaleMode, Window, WindowOptions};
use nescore::{
    cartridge::cartridge::Cartridge,
    controller::{
        BUTTON_A, BUTTON_B, BUTTON_DOWN, BUTTON_LEFT, BUTTON_RIGHT, BUTTON_SELECT, BUTTON_START,
        BUTTON_UP, NoInput,
    },
    machine::Machine,
    ppu::frame::{self, HEIGHT, WIDTH},
};

const KEYMAP: [(Key, u8); 8] = [
    (Key::Z, BUTTON_A),
    (Key::X, BUTTON_B),
    (Key::RightShift, BUTTON_SELECT),
    (Key::Enter, BUTTON_START),
    (Key::Up, BUTTON_UP),
    (Key::Down, BUTTON_DOWN),
    (Key::Left, BUTTON_LEFT),
    (Key::Right, BUTTON_RIGHT),
];

struct Args {
    path: String,
    frames: Option<u64>,
}

fn parse_args() -> Result<Args, String> {
    let mut path = None;
    let mut frames = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--frames" {
            let n = args.next().ok_or("--frames needs a count")?;
            frames = Some(n.parse().map_err(|_| format!("bad frame count: {n}"))?);
        } else if path.is_none() {
            path = Some(arg);
        } else {
            return Err(format!("unexpected argument: {arg}"));
        }
    }
    let path = path.ok_or("usage: nescore <rom.nes> [--frames N]")?;
    Ok(Args { path, frames })
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", Red.bold().paint("error"), message);
    process::exit(1);
}

fn main() {
    env_logger::init();

    let args = parse_args().unwrap_or_else(|e| fail(e));
    let cart = Cartridge::load(&args.path).unwrap_or_else(|e| fail(e));
    println!(
        "{} {} ({}, mapper {}, {} KiB PRG, {} KiB CHR)",
        Green.bold().paint("loaded"),
        args.path,
        cart.mapper.name(),
        cart.header.mapper_id,
        usize::from(cart.header.prg_banks) * 16,
        usize::from(cart.header.chr_banks) * 8,
    );

    match args.frames {
        Some(frames) => run_headless(cart, frames),
        None => run_window(cart),
    }
}

/// Run `frames` frames with no input and print the final frame checksum.
fn run_headless(cart: Cartridge, frames: u64) {
    let mut machine = Machine::new(cart, Box::new(NoInput));
    for _ in 0..frames {
        machine.run_frame();
    }
    println!("{:016X}", frame::checksum(machine.frame()));
}

fn run_window(cart: Cartridge) {
    let buttons = Rc::new(Cell::new(0u8));
    let input = Rc::clone(&buttons);
    let mut machine = Machine::new(cart, Box::new(move || input.get()));

    let mut window = Window::new(
        "nescore",
        WIDTH,
        HEIGHT,
        WindowOptions {
            resize: true,
            scale: Scale::X2,
            scale_mode: ScaleMode::AspectRatioStretch,
            ..WindowOptions::default()
        },
    )
    .unwrap_or_else(|e| fail(e));
    window.set_target_fps(60);

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let pressed = KEYMAP
            .iter()
            .filter(|(key, _)| window.is_key_down(*key))
            .fold(0, |acc, (_, bit)| acc | bit);
        buttons.set(pressed);

        let frame = machine.run_frame();
        if let Err(e) = window.update_with_buffer(frame, WIDTH, HEIGHT) {
            fail(e);
        }
    }
}
