//! Build script for coilgun-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Parses and validates coilgun.toml, then emits it as Rust constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use coilgun_core::config::{SequencerConfig, StageConfig};
use serde::Deserialize;

/// GPIOs with a fixed role on the board (UART0, ADC inputs)
const RESERVED_GPIO: &[u8] = &[0, 1, 26, 27, 28, 29];
const GPIO_COUNT: u8 = 30;
const ADC_CHANNELS: u8 = 4;

#[derive(Deserialize)]
struct ConfigFile {
    board: BoardConfig,
    sequencer: SequencerConfig,
}

#[derive(Deserialize)]
struct BoardConfig {
    #[serde(default)]
    relay_active_low: bool,
    #[serde(default = "default_baud")]
    baud: u32,
}

fn default_baud() -> u32 {
    115_200
}

fn main() {
    setup_linker();
    generate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Parse coilgun.toml, validate it and write `$OUT_DIR/coilgun_config.rs`
fn generate_config() {
    println!("cargo:rerun-if-changed=coilgun.toml");

    let config_path = Path::new("coilgun.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read coilgun.toml", &[e.to_string()]),
    };

    let file: ConfigFile = match toml::from_str(&content) {
        Ok(file) => file,
        Err(e) => fail(
            "Invalid coilgun.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    if let Err(e) = file.sequencer.validate() {
        errors.push(e.to_string());
    }
    errors.extend(board_errors(&file.sequencer));
    if file.board.baud == 0 {
        errors.push("board.baud must be non-zero".to_string());
    }
    if !errors.is_empty() {
        fail("Invalid coilgun configuration", &errors);
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let generated = render_config(&file);
    fs::write(out_dir.join("coilgun_config.rs"), generated).unwrap();

    println!("cargo:warning=coilgun.toml validated successfully");
}

/// Wiring checks that depend on the RP2040 pinout
fn board_errors(config: &SequencerConfig) -> Vec<String> {
    let mut errors = Vec::new();

    for (index, stage) in config.stages.iter().enumerate() {
        let ordinal = index + 1;
        let gpio = stage.coil.0;
        if gpio >= GPIO_COUNT {
            errors.push(format!("stage {}: coil gpio{} does not exist", ordinal, gpio));
        } else if RESERVED_GPIO.contains(&gpio) {
            errors.push(format!(
                "stage {}: coil gpio{} is reserved for UART/ADC",
                ordinal, gpio
            ));
        }

        if let Some(gate) = &stage.gate {
            if gate.channel.0 >= ADC_CHANNELS {
                errors.push(format!(
                    "stage {}: gate channel {} is not an ADC input (0-3)",
                    ordinal, gate.channel.0
                ));
            }
        }
    }

    errors
}

fn render_stage(stage: &StageConfig) -> String {
    let gate = match &stage.gate {
        Some(gate) => format!(
            "Some(GateConfig {{ channel: GateChannel({}), threshold: {} }})",
            gate.channel.0, gate.threshold
        ),
        None => "None".to_string(),
    };

    format!(
        "        StageConfig {{\n\
        \x20           coil: CoilChannel({}),\n\
        \x20           gate: {},\n\
        \x20           max_duration_ms: {},\n\
        \x20           distance_to_next: {:?},\n\
        \x20       }},\n",
        stage.coil.0, gate, stage.max_duration_ms, stage.distance_to_next
    )
}

fn render_config(file: &ConfigFile) -> String {
    let seq = &file.sequencer;
    let stages: String = seq.stages.iter().map(render_stage).collect();

    format!(
        "// Generated from coilgun.toml by build.rs\n\
        \n\
        pub const RELAY_ACTIVE_LOW: bool = {};\n\
        pub const BAUD: u32 = {};\n\
        \n\
        pub const SEQUENCER: SequencerConfig = SequencerConfig {{\n\
        \x20   stages: [\n{}    ],\n\
        \x20   cooldown_ms: {},\n\
        \x20   diagnostics: DiagnosticsConfig {{\n\
        \x20       pulse_ms: {},\n\
        \x20       settle_ms: {},\n\
        \x20       tolerance: {},\n\
        \x20   }},\n\
        }};\n",
        file.board.relay_active_low,
        file.board.baud,
        stages,
        seq.cooldown_ms,
        seq.diagnostics.pulse_ms,
        seq.diagnostics.settle_ms,
        seq.diagnostics.tolerance,
    )
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let truncated = if line.chars().count() > 62 {
                format!("{}...", line.chars().take(59).collect::<String>())
            } else {
                line.clone()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
