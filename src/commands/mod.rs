#[cfg(feature = "inpaint")]
mod edit;
#[cfg(feature = "inpaint")]
mod inpaint;
mod mask;
mod resize;
mod utils;

use crate::cli::{Cli, Commands, GlobalOptions};
use maskpaint::{MaskPaintResult, ResizePolicy};

/// The main function to run the command based on CLI input.
pub fn run(cli: Cli) -> MaskPaintResult<()> {
    let Cli { global, command } = cli;
    dispatch(&global, command)
}

/// Dispatch the command to the appropriate handler.
fn dispatch(global: &GlobalOptions, command: Commands) -> MaskPaintResult<()> {
    match command {
        Commands::Mask(cmd) => mask::run(cmd),
        Commands::Pad(cmd) => resize::run(global, cmd, ResizePolicy::Pad),
        Commands::Stretch(cmd) => resize::run(global, cmd, ResizePolicy::Stretch),
        #[cfg(feature = "inpaint")]
        Commands::Inpaint(cmd) => inpaint::run(global, cmd),
        #[cfg(feature = "inpaint")]
        Commands::Edit(cmd) => edit::run(global, cmd),
    }
}
