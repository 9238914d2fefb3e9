#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;

/// Renders an extruded greeting surrounded by matcap shaded primitives.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Text to extrude. `\n` starts a new line.
    #[arg(long)]
    text: Option<String>,

    /// Number of random primitives around the text.
    #[arg(long)]
    count: Option<usize>,

    /// Typeface JSON font, relative to the asset directory.
    #[arg(long)]
    font: Option<String>,

    /// Directory the font and matcap paths are relative to.
    #[arg(long)]
    assets: Option<String>,
}

#[cfg(not(target_arch = "wasm32"))]
impl Args {
    fn into_config(self) -> matcap_scene::SceneConfig {
        let mut config = matcap_scene::SceneConfig::default();
        if let Some(text) = self.text {
            config.text = text.replace("\\n", "\n");
        }
        if let Some(count) = self.count {
            config.primitive_count = count;
        }
        if let Some(font) = self.font {
            config.font = font;
        }
        if let Some(assets) = self.assets {
            config.asset_root = assets;
        }
        config
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    let config = Args::parse().into_config();
    matcap_scene::run(config)
}

#[cfg(target_arch = "wasm32")]
fn main() {}
