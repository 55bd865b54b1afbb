use maskpaint::MaskPaintError;

pub fn report_error(err: &MaskPaintError) {
    match err {
        MaskPaintError::Auth(message) => {
            eprintln!("Authentication failed: {message}");
            eprintln!();
            eprintln!("Please provide an API key:");
            eprintln!("  - Use --api-key <key>");
            eprintln!(
                "  - Or set environment variable {} to your key",
                maskpaint::ENV_API_KEY
            );
        }
        MaskPaintError::InvalidRegion { .. } => {
            eprintln!("{err}");
            eprintln!(
                "Regions are four x,y pairs in image pixels, e.g. 420,25,620,25,620,300,420,300"
            );
        }
        _ => {
            eprintln!("{err}");
        }
    }
}
