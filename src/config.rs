use std::path::PathBuf;

/// Options shared by the CLI commands
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Directory holding `tileset/<name>.cv5` and `tileset/<name>/dddata.bin`
    pub tileset_dir: PathBuf,
    /// Overlay pixels per map tile
    pub overlay_scale: u32,
    pub optimise_png: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            tileset_dir: PathBuf::from("."),
            overlay_scale: 4,
            optimise_png: true,
        }
    }
}
