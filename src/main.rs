use clap::Parser;
use rwall::{RwallConfig, gui};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rwall")]
#[command(
    version,
    about = "Fetches a wallpaper collection from a git repository and lets you pick one as your desktop wallpaper."
)]
struct Args {
    #[arg(
        short,
        long,
        help = "Folder to keep wallpapers in (will be saved in config if used once)"
    )]
    folder: Option<PathBuf>,
    #[arg(
        short,
        long,
        help = "Git repository to fetch wallpapers from (will be saved in config if used once)"
    )]
    repository: Option<String>,
    #[arg(long, help = "Theme name, e.g. Dark, Nord or TokyoNight")]
    theme: Option<String>,
}

fn staging_for(library: &Path) -> PathBuf {
    let mut name = library
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from("rwall"));
    name.push("_temp");
    library.with_file_name(name)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = RwallConfig::load_or_default()?;
    let overridden = args.folder.is_some() || args.repository.is_some() || args.theme.is_some();

    if let Some(folder) = args.folder {
        config.staging_folder = staging_for(&folder);
        config.library_folder = folder;
    }
    if let Some(repository) = args.repository {
        config.repository = repository;
    }
    if let Some(theme) = args.theme {
        config.theme = theme;
    }
    if overridden {
        config.save()?;
    }

    log::info!(
        "Library {} from {}",
        config.library_folder.display(),
        config.repository
    );
    gui::run_picker(config)?;
    Ok(())
}
