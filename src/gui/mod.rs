pub mod picker;

use crate::config::RwallConfig;

pub fn run_picker(config: RwallConfig) -> crate::Result<()> {
    use iced::Result as IcedResult;

    let result: IcedResult = picker::run_wallpaper_picker(config);

    result.map_err(|e| crate::Error::DesktopEnv(format!("GUI error: {e}")))?;
    Ok(())
}
