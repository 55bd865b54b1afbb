use maskpaint::{MaskPaintResult, generate_mask};

use crate::cli::MaskCommand;

use super::utils::derive_variant_path;

/// Run the mask command.
pub fn run(cmd: MaskCommand) -> MaskPaintResult<()> {
    let output_path = cmd
        .output
        .clone()
        .unwrap_or_else(|| derive_variant_path(&cmd.input, "mask", "png"));

    let written = generate_mask(&cmd.input, &output_path, &cmd.region)?;
    println!("Transparent mask saved as: {}", written.display());

    Ok(())
}
