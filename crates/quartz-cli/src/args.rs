//! Command-line argument definitions for the Quartz CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Global flags control configuration file selection,
//! logging verbosity and strict parsing; each subcommand maps to one
//! document operation.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use quartz::field::ColorField;

/// Command-line arguments for the Quartz VFX tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Refuse documents that produce indexing diagnostics
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print systems, emitters, color properties and map state
    List(InputArgs),

    /// Print systems missing from the resource map
    Unregistered(InputArgs),

    /// Generate variant systems behind a randomizer emitter
    Randomize(RandomizeArgs),

    /// Move every emitter into its own wrapper system
    Split(SplitArgs),

    /// Recolor emitter color properties or material params
    Recolor(RecolorArgs),

    /// Change the blend mode of emitters
    BlendMode(BlendModeArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct InputArgs {
    /// Path to the input document
    pub input: String,
}

/// Input document plus where to write the result.
#[derive(ClapArgs, Debug, Clone)]
pub struct EditArgs {
    /// Path to the input document
    pub input: String,

    /// Output path; the input is overwritten when omitted
    #[arg(short, long)]
    pub output: Option<String>,
}

impl EditArgs {
    pub fn output_path(&self) -> &str {
        self.output.as_deref().unwrap_or(&self.input)
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RandomizeArgs {
    #[command(flatten)]
    pub document: EditArgs,

    /// System keys to randomize
    #[arg(short, long = "system", required = true)]
    pub systems: Vec<String>,

    /// Emitter names; randomizes whole systems when omitted
    #[arg(short, long = "emitter")]
    pub emitters: Vec<String>,

    /// Variant suffixes, one generated system each
    #[arg(long = "suffix", required = true, value_delimiter = ',')]
    pub suffixes: Vec<String>,

    /// Rewrite asset paths of each variant into its own folder
    #[arg(long)]
    pub isolate_assets: bool,

    /// Write the asset provenance record to this TOML file
    #[arg(long)]
    pub provenance: Option<String>,

    /// Copy isolated assets into place under this project root
    #[arg(long)]
    pub copy_assets: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SplitArgs {
    #[command(flatten)]
    pub document: EditArgs,

    /// System keys to split; every system when omitted
    #[arg(short, long = "system")]
    pub systems: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Random,
    Linear,
    Shift,
    ShiftHue,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RecolorArgs {
    #[command(flatten)]
    pub document: EditArgs,

    /// How new colors are derived
    #[arg(short, long, value_enum)]
    pub mode: ModeArg,

    /// Palette name from the configuration file
    #[arg(short, long, conflicts_with = "colors")]
    pub palette: Option<String>,

    /// Palette colors, e.g. `#ff0000,orange@0.5`
    #[arg(long, value_delimiter = ',')]
    pub colors: Vec<String>,

    /// Hue in degrees: the delta for `shift`, the new hue for `shift-hue`
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub hue: f32,

    /// Saturation delta in percent for `shift`
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub saturation: f32,

    /// Lightness delta in percent for `shift`
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub lightness: f32,

    /// Color fields to touch; all when omitted
    #[arg(short, long = "field", value_parser = parse_field)]
    pub fields: Vec<ColorField>,

    /// Only recolor values close to one of these colors
    #[arg(long = "only", value_delimiter = ',')]
    pub filter: Vec<String>,

    /// Filter tolerance in 8-bit channel units
    #[arg(long, default_value_t = 0.0)]
    pub tolerance: f32,

    /// Re-roll random picks that land on pure black or white
    #[arg(long)]
    pub ignore_black_white: bool,

    /// Restrict to these systems
    #[arg(short, long = "system")]
    pub systems: Vec<String>,

    /// Restrict to emitters with these names
    #[arg(short, long = "emitter")]
    pub emitters: Vec<String>,

    /// Recolor material params instead of emitters
    #[arg(long)]
    pub materials: bool,

    /// Material keys for `--materials`; all when omitted
    #[arg(long = "material", requires = "materials")]
    pub material_keys: Vec<String>,

    /// Param names for `--materials`; all when omitted
    #[arg(long = "param", requires = "materials")]
    pub params: Vec<String>,

    /// Seed for `random` mode
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct BlendModeArgs {
    #[command(flatten)]
    pub document: EditArgs,

    /// System owning the emitters
    #[arg(short, long)]
    pub system: String,

    /// Emitter names; every emitter with a blend mode when omitted
    #[arg(short, long = "emitter")]
    pub emitters: Vec<String>,

    /// New blend mode value
    #[arg(long)]
    pub value: u8,
}

fn parse_field(value: &str) -> Result<ColorField, String> {
    value.parse()
}
