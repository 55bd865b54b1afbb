use maskpaint::{InpaintClient, MaskPaint, MaskPaintResult};

use crate::cli::{EditCommand, GlobalOptions};

use super::utils::{build_settings, derive_variant_path, resolve_export_path};

/// Run the edit command: normalize, mask, submit, download.
pub fn run(global: &GlobalOptions, cmd: EditCommand) -> MaskPaintResult<()> {
    // Fail on a missing key before doing any image work.
    let client = InpaintClient::new(build_settings(global, &cmd.api))?;

    let prepared = MaskPaint::new()
        .with_target_size(global.size)
        .with_resize_filter(global.resample_filter.into())
        .with_policy(cmd.policy.into())
        .for_image(&cmd.input)?;
    let mask = prepared.mask(&cmd.region);

    if let Some(path) = resolve_export_path(&cmd.export_image, &cmd.input, "normalized") {
        let written = prepared.save(&path)?;
        println!("Normalized image saved to {}", written.display());
    }
    if let Some(path) = resolve_export_path(&cmd.export_mask, &cmd.input, "mask") {
        let written = mask.save(&path)?;
        println!("Transparent mask saved as: {}", written.display());
    }

    let url = client.edit_prepared(&prepared, &mask, &cmd.prompt)?;

    if !cmd.no_save {
        let output_path = cmd
            .output
            .clone()
            .unwrap_or_else(|| derive_variant_path(&cmd.input, "inpainted", "png"));
        let written = client.download(&url, &output_path)?;
        println!("Inpainted image saved to {}", written.display());
    }
    println!("{url}");

    Ok(())
}
