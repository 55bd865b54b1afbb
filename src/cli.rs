use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use image::imageops::FilterType;
use maskpaint::{Region, ResizePolicy, TargetSize};

/// Command line interface definition.
#[derive(Parser, Debug)]
#[command(author, version, about, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalOptions {
    /// Target resolution required by the edit service
    #[arg(long, global = true, default_value = "1024x1024", value_parser = parse_size)]
    pub size: TargetSize,
    /// Filter used whenever an image has to be resampled
    #[arg(
        long = "resample-filter",
        global = true,
        value_enum,
        default_value_t = ResampleFilter::Lanczos3
    )]
    pub resample_filter: ResampleFilter,
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a transparent PNG mask over a region of an image
    Mask(MaskCommand),
    /// Shrink an image to fit the target size and pad it to a square
    Pad(ResizeCommand),
    /// Stretch an image to exactly the target size
    Stretch(ResizeCommand),
    /// Send an image and mask to the edit service
    #[cfg(feature = "inpaint")]
    Inpaint(InpaintCommand),
    /// Normalize, mask and edit an image in one go
    #[cfg(feature = "inpaint")]
    Edit(EditCommand),
}

/// Resampling filters for image resizing.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResampleFilter> for FilterType {
    /// Convert ResampleFilter to image::imageops::FilterType.
    fn from(value: ResampleFilter) -> Self {
        match value {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// The argument to pick how the source is brought to the target size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    Pad,
    Stretch,
    /// Send the source at its own resolution
    None,
}

impl From<PolicyArg> for Option<ResizePolicy> {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Pad => Some(ResizePolicy::Pad),
            PolicyArg::Stretch => Some(ResizePolicy::Stretch),
            PolicyArg::None => None,
        }
    }
}

#[derive(Args, Debug)]
pub struct MaskCommand {
    /// Source image path
    pub input: PathBuf,
    /// Editable region as `x1,y1,x2,y2,x3,y3,x4,y4`
    #[arg(short, long, value_parser = parse_region, allow_hyphen_values = true)]
    pub region: Region,
    /// Output path (defaults to `<name>-mask.png`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ResizeCommand {
    /// Input image path
    pub input: PathBuf,
    /// Output path (defaults to `<name>-padded.png` or `<name>-stretched.png`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Treat the input as a mask (black padding, grayscale stretch)
    #[arg(long)]
    pub mask: bool,
}

#[cfg(feature = "inpaint")]
#[derive(Args, Debug)]
pub struct ApiArgs {
    /// API key for the edit service
    #[arg(long = "api-key", env = maskpaint::ENV_API_KEY, hide_env_values = true)]
    pub api_key: Option<String>,
    /// Model identifier
    #[arg(long, default_value = maskpaint::DEFAULT_MODEL)]
    pub model: String,
    /// API base URL
    #[arg(long, default_value = maskpaint::DEFAULT_ENDPOINT)]
    pub endpoint: String,
    /// Request timeout in seconds
    #[arg(long = "timeout")]
    pub timeout_secs: Option<u64>,
}

#[cfg(feature = "inpaint")]
#[derive(Args, Debug)]
pub struct InpaintCommand {
    /// Source image path (PNG at the target size)
    pub image: PathBuf,
    /// Mask path (PNG, transparent where the image may change)
    pub mask: PathBuf,
    /// Description of what to generate in the masked area
    #[arg(short, long)]
    pub prompt: String,
    /// Where to save the result (defaults to `<name>-inpainted.png`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Only print the result URL, do not download it
    #[arg(long = "no-save")]
    pub no_save: bool,
    #[command(flatten)]
    pub api: ApiArgs,
}

#[cfg(feature = "inpaint")]
#[derive(Args, Debug)]
pub struct EditCommand {
    /// Source image path
    pub input: PathBuf,
    /// Editable region as `x1,y1,x2,y2,x3,y3,x4,y4` in source coordinates
    #[arg(short, long, value_parser = parse_region, allow_hyphen_values = true)]
    pub region: Region,
    /// Description of what to generate in the region
    #[arg(short, long)]
    pub prompt: String,
    /// How to bring the source to the target size
    #[arg(long, value_enum, default_value_t = PolicyArg::Pad)]
    pub policy: PolicyArg,
    /// Where to save the result (defaults to `<name>-inpainted.png`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Only print the result URL, do not download it
    #[arg(long = "no-save")]
    pub no_save: bool,
    /// Save the generated mask alongside the result
    #[arg(long = "export-mask", value_name = "PATH", num_args = 0..=1)]
    pub export_mask: Option<Option<PathBuf>>,
    /// Save the normalized source alongside the result
    #[arg(long = "export-image", value_name = "PATH", num_args = 0..=1)]
    pub export_image: Option<Option<PathBuf>>,
    #[command(flatten)]
    pub api: ApiArgs,
}

fn parse_region(value: &str) -> Result<Region, String> {
    value.parse::<Region>().map_err(|err| err.to_string())
}

fn parse_size(value: &str) -> Result<TargetSize, String> {
    value.parse::<TargetSize>().map_err(|err| err.to_string())
}
