use super::WallpaperManager;
use crate::utils::command_exists;
use crate::{Error, Result};
use std::path::Path;
use std::process::Command;

pub struct PlasmaManager;

impl PlasmaManager {
    pub fn new() -> Result<Self> {
        if !command_exists("qdbus") {
            return Err(Error::DesktopEnv(
                "QDBus command not found. Please install qdbus.".to_string(),
            ));
        }
        Ok(Self)
    }

    pub fn is_available() -> bool {
        std::env::var("KDE_SESSION_VERSION").is_ok()
    }
}

fn desktop_script(path: &Path) -> String {
    let image = format!("file://{}", path.to_string_lossy());
    // JSON string syntax is a valid JS string literal.
    let image = serde_json::Value::String(image).to_string();
    format!(
        r#"
        var allDesktops = desktops();
        for (i=0;i<allDesktops.length;i++) {{
            d = allDesktops[i];
            d.wallpaperPlugin = "org.kde.image";
            d.currentConfigGroup = Array("Wallpaper", "org.kde.image", "General");
            d.writeConfig("Image", {image});
        }}
        "#
    )
}

impl WallpaperManager for PlasmaManager {
    fn name(&self) -> &'static str {
        "plasma"
    }

    fn set_wallpaper(&self, path: &Path) -> Result<()> {
        let output = Command::new("qdbus")
            .args([
                "org.kde.plasmashell",
                "/PlasmaShell",
                "org.kde.PlasmaShell.evaluateScript",
            ])
            .arg(desktop_script(path))
            .output()?;

        if !output.status.success() {
            return Err(Error::DesktopEnv(format!(
                "Failed to set wallpaper: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        Ok(())
    }
}
