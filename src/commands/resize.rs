use maskpaint::{MaskPaintResult, ResizePolicy, normalize_file};

use crate::cli::{GlobalOptions, ResizeCommand};

use super::utils::{derive_variant_path, normalize_options};

/// Run the pad or stretch command.
pub fn run(
    global: &GlobalOptions,
    cmd: ResizeCommand,
    policy: ResizePolicy,
) -> MaskPaintResult<()> {
    let suffix = match policy {
        ResizePolicy::Pad => "padded",
        ResizePolicy::Stretch => "stretched",
    };
    let output_path = cmd
        .output
        .clone()
        .unwrap_or_else(|| derive_variant_path(&cmd.input, suffix, "png"));

    let options = normalize_options(global).with_mask_mode(cmd.mask);
    let written = normalize_file(&cmd.input, &output_path, policy, &options)?;

    match policy {
        ResizePolicy::Pad => println!("Saved resized image: {}", written.display()),
        ResizePolicy::Stretch => println!(
            "Saved {}: {}",
            if cmd.mask { "mask" } else { "image" },
            written.display()
        ),
    }

    Ok(())
}
