use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use pico_args::Arguments;

use tess_engine::mesh::MAX_TESS_LEVEL;

pub const HELP: &str = "\
tess-viewer

Renders a mesh with and without Phong tessellation and reports the GPU time
spent drawing it in the window title.

usage: tess-viewer [options]

Options:
  --mesh <path>         OBJ file to load. Default: teapot.obj
  --width <px>          Initial window width. Default: 960
  --height <px>         Initial window height. Default: 650
  --tess-level <1..5>   Start with tessellation on at this level.
  --log <filter>        env_logger filter, e.g. 'debug' or 'tess_engine=trace'.
  -h, --help            This message.

Controls:
  Esc          quit
  W            toggle wireframe
  T            toggle tessellation
  Up / Down    raise / lower the tessellation level
  1 / 2        specular / procedural texture
  V            toggle per-vertex lighting (untessellated only)
  left drag    orbit
  wheel        zoom
";

/// Command-line configuration of the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub mesh: PathBuf,
    pub width: u32,
    pub height: u32,
    pub log_filter: Option<String>,
    pub tess_level: Option<u32>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            mesh: PathBuf::from("teapot.obj"),
            width: 960,
            height: 650,
            log_filter: None,
            tess_level: None,
        }
    }
}

impl ViewerConfig {
    /// Parses the process arguments. Returns `Ok(None)` when help was requested.
    pub fn from_env() -> Result<Option<Self>> {
        Self::parse(Arguments::from_env())
    }

    pub fn from_args(args: Vec<OsString>) -> Result<Option<Self>> {
        Self::parse(Arguments::from_vec(args))
    }

    fn parse(mut args: Arguments) -> Result<Option<Self>> {
        if args.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let defaults = Self::default();
        let config = Self {
            mesh: args
                .opt_value_from_os_str("--mesh", |s| Ok::<_, std::convert::Infallible>(PathBuf::from(s)))
                .context("--mesh")?
                .unwrap_or(defaults.mesh),
            width: args
                .opt_value_from_fn("--width", parse_extent)
                .context("--width")?
                .unwrap_or(defaults.width),
            height: args
                .opt_value_from_fn("--height", parse_extent)
                .context("--height")?
                .unwrap_or(defaults.height),
            log_filter: args.opt_value_from_str("--log").context("--log")?,
            tess_level: args
                .opt_value_from_fn("--tess-level", parse_tess_level)
                .context("--tess-level")?,
        };

        let rest = args.finish();
        if !rest.is_empty() {
            bail!("unexpected arguments: {rest:?}\n\n{HELP}");
        }

        Ok(Some(config))
    }
}

fn parse_extent(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(format!("'{s}' is not a positive pixel count")),
    }
}

fn parse_tess_level(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(v) if (1..=MAX_TESS_LEVEL).contains(&v) => Ok(v),
        _ => Err(format!("'{s}' is not a level in 1..={MAX_TESS_LEVEL}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<ViewerConfig>> {
        ViewerConfig::from_args(args.iter().map(OsString::from).collect())
    }

    #[test]
    fn no_arguments_yield_defaults() {
        assert_eq!(parse(&[]).unwrap(), Some(ViewerConfig::default()));
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(parse(&["--help"]).unwrap(), None);
        assert_eq!(parse(&["--width", "10", "-h"]).unwrap(), None);
    }

    #[test]
    fn all_options_are_read() {
        let cfg = parse(&[
            "--mesh", "models/bunny.obj",
            "--width", "800",
            "--height", "600",
            "--log", "debug",
            "--tess-level", "4",
        ])
        .unwrap()
        .unwrap();

        assert_eq!(cfg.mesh, PathBuf::from("models/bunny.obj"));
        assert_eq!((cfg.width, cfg.height), (800, 600));
        assert_eq!(cfg.log_filter.as_deref(), Some("debug"));
        assert_eq!(cfg.tess_level, Some(4));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(parse(&["--width", "0"]).is_err());
        assert!(parse(&["--tess-level", "6"]).is_err());
        assert!(parse(&["--tess-level", "zero"]).is_err());
    }

    #[test]
    fn unknown_arguments_are_rejected() {
        assert!(parse(&["--fullscreen"]).is_err());
    }
}
