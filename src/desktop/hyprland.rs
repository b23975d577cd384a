use super::WallpaperManager;
use crate::utils::command_exists;
use crate::{Error, Result};
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

static WALLPAPER_TOOLS: OnceLock<WallpaperTools> = OnceLock::new();

#[derive(Debug, Clone, Copy)]
struct WallpaperTools {
    has_hyprpaper: bool,
    has_swww: bool,
    has_swaybg: bool,
}

impl WallpaperTools {
    fn detect() -> Self {
        Self {
            has_hyprpaper: command_exists("hyprpaper"),
            has_swww: command_exists("swww"),
            has_swaybg: command_exists("swaybg"),
        }
    }

    fn has_any(&self) -> bool {
        self.has_hyprpaper || self.has_swww || self.has_swaybg
    }
}

pub struct HyprlandManager {
    tools: WallpaperTools,
}

impl HyprlandManager {
    pub fn new() -> Result<Self> {
        let tools = *WALLPAPER_TOOLS.get_or_init(WallpaperTools::detect);
        if !tools.has_any() {
            return Err(Error::DesktopEnv(
                "No supported wallpaper tool found. Please install one of hyprpaper, swww, or swaybg."
                    .to_string(),
            ));
        }
        Ok(Self { tools })
    }

    pub fn is_available() -> bool {
        std::env::var("HYPRLAND_INSTANCE_SIGNATURE").is_ok()
            || Command::new("hyprctl").arg("version").output().is_ok()
    }

    fn run(tool: &str, mut command: Command) -> Result<bool> {
        let output = command.output()?;
        if !output.status.success() {
            log::warn!(
                "{tool} command failed: {}",
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(output.status.success())
    }
}

fn hyprpaper_commands(path: &Path) -> [Command; 2] {
    let mut preload = Command::new("hyprctl");
    preload.args(["hyprpaper", "preload"]).arg(path);

    let mut wallpaper = Command::new("hyprctl");
    wallpaper
        .args(["hyprpaper", "wallpaper"])
        .arg(format!(",{}", path.display()));

    [preload, wallpaper]
}

fn swww_command(path: &Path) -> Command {
    let mut command = Command::new("swww");
    command.arg("img").arg(path).args(["-t", "grow"]);
    command
}

impl WallpaperManager for HyprlandManager {
    fn name(&self) -> &'static str {
        "hyprland"
    }

    fn set_wallpaper(&self, path: &Path) -> Result<()> {
        if self.tools.has_hyprpaper {
            let [preload, wallpaper] = hyprpaper_commands(path);
            if Self::run("hyprpaper", preload)? && Self::run("hyprpaper", wallpaper)? {
                return Ok(());
            }
        }

        if self.tools.has_swww && Self::run("swww", swww_command(path))? {
            return Ok(());
        }

        if self.tools.has_swaybg {
            match Command::new("swaybg").arg("-i").arg(path).spawn() {
                Ok(_) => return Ok(()),
                Err(e) => log::warn!("swaybg failed to start: {e}"),
            }
        }

        Err(Error::DesktopEnv(
            "Failed to set wallpaper. No supported wallpaper tool (hyprpaper, swww, or swaybg) succeeded".to_string()
        ))
    }
}
