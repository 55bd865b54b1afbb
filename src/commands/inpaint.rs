use maskpaint::{InpaintClient, MaskPaintResult};

use crate::cli::{GlobalOptions, InpaintCommand};

use super::utils::{build_settings, derive_variant_path};

/// Run the inpaint command.
pub fn run(global: &GlobalOptions, cmd: InpaintCommand) -> MaskPaintResult<()> {
    let client = InpaintClient::new(build_settings(global, &cmd.api))?;
    let url = client.edit_files(&cmd.image, &cmd.mask, &cmd.prompt)?;

    if !cmd.no_save {
        let output_path = cmd
            .output
            .clone()
            .unwrap_or_else(|| derive_variant_path(&cmd.image, "inpainted", "png"));
        let written = client.download(&url, &output_path)?;
        println!("Inpainted image saved to {}", written.display());
    }
    println!("{url}");

    Ok(())
}
