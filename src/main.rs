//! Spirits Gallery: walk a small lit room, pick up a bottle and drink from it.

mod config;
mod game;
mod input;

use std::env;
use std::path::PathBuf;

use anyhow::Result;
use tracing::info;
use winit::event_loop::{ControlFlow, EventLoop};

use config::{GalleryConfig, DEFAULT_CONFIG_PATH};
use game::{GameAction, GameWorld};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = CliOptions::parse(env::args().skip(1));
    let mut config = GalleryConfig::load_from_path(&cli.config_path);
    cli.apply(&mut config);

    if cli.save_config {
        config.save_to_path(&cli.config_path)?;
        info!("Wrote config to {}", cli.config_path.display());
    }

    info!("Starting Spirits Gallery");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut game = GameWorld::new(&event_loop, &config)?;

    event_loop.run(move |event, elwt| match game.handle_event(&event, elwt) {
        GameAction::Continue => {}
        GameAction::Quit => {
            info!("Quitting");
            elwt.exit();
        }
    })?;

    info!("Spirits Gallery shutting down");
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    config_path: PathBuf,
    resolution: Option<(u32, u32)>,
    assets: Option<PathBuf>,
    save_config: bool,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            resolution: None,
            assets: None,
            save_config: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    if let Some(path) = args.next() {
                        opts.config_path = PathBuf::from(path);
                    } else {
                        tracing::error!("--config requires a file path");
                    }
                }
                "--resolution" => {
                    if let Some(raw) = args.next() {
                        match parse_resolution(&raw) {
                            Some(resolution) => opts.resolution = Some(resolution),
                            None => {
                                tracing::error!(value = %raw, "--resolution must be like 800x600");
                            }
                        }
                    } else {
                        tracing::error!("--resolution requires a value like 800x600");
                    }
                }
                "--assets" => {
                    if let Some(path) = args.next() {
                        opts.assets = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--assets requires a directory path");
                    }
                }
                "--save-config" => opts.save_config = true,
                other => tracing::warn!(arg = other, "Ignoring unknown argument"),
            }
        }

        opts
    }

    fn apply(&self, config: &mut GalleryConfig) {
        if let Some((width, height)) = self.resolution {
            config.window_width = width;
            config.window_height = height;
        }
        if let Some(assets) = &self.assets {
            config.asset_root = assets.clone();
        }
    }
}

fn parse_resolution(raw: &str) -> Option<(u32, u32)> {
    let (w, h) = raw.split_once('x')?;
    match (w.parse::<u32>(), h.parse::<u32>()) {
        (Ok(width), Ok(height)) if width > 0 && height > 0 => Some((width, height)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliOptions {
        CliOptions::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_without_arguments() {
        let opts = parse(&[]);
        assert_eq!(opts.config_path, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(opts.resolution, None);
        assert_eq!(opts.assets, None);
        assert!(!opts.save_config);
    }

    #[test]
    fn parses_every_flag() {
        let opts = parse(&[
            "--config",
            "my.toml",
            "--resolution",
            "1024x768",
            "--assets",
            "data",
            "--save-config",
        ]);
        assert_eq!(opts.config_path, PathBuf::from("my.toml"));
        assert_eq!(opts.resolution, Some((1024, 768)));
        assert_eq!(opts.assets, Some(PathBuf::from("data")));
        assert!(opts.save_config);
    }

    #[test]
    fn bad_resolution_is_ignored() {
        assert_eq!(parse(&["--resolution", "0x600"]).resolution, None);
        assert_eq!(parse(&["--resolution", "wide"]).resolution, None);
        assert_eq!(parse(&["--resolution"]).resolution, None);
    }

    #[test]
    fn overrides_apply_to_config() {
        let opts = parse(&["--resolution", "640x480", "--assets", "elsewhere"]);
        let mut config = GalleryConfig::default();
        opts.apply(&mut config);
        assert_eq!((config.window_width, config.window_height), (640, 480));
        assert_eq!(config.asset_root, PathBuf::from("elsewhere"));
        assert_eq!(config.fov_degrees, GalleryConfig::default().fov_degrees);
    }
}
