use clap::Parser;
use std::path::PathBuf;

pub const KEYBINDS: &str = "\
Keybinds:
  q      Exit
  h      Toggle this help
  space  Toggle unicode mode (default on)
  d      Toggle date and time
  b      Toggle battery
  c      Toggle load and CPU utilisation
  m      Toggle memory usage
  t      Toggle CPU temperature";

/// a tiny system monitor for Linux
#[derive(Debug, Parser)]
#[command(name = "tmon", version, about, after_help = KEYBINDS)]
pub struct Args {
    /// Config file to use instead of ~/.config/tmon.toml
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Refresh interval in milliseconds, overriding the config file
    #[arg(short, long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Start with plain ASCII bars instead of unicode
    #[arg(short, long)]
    pub plain: bool,

    /// Write a debug log to $TMPDIR/tmon.log
    #[arg(short, long)]
    pub log: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["tmon"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.interval.is_none());
        assert!(!args.plain);
        assert!(!args.log);
    }

    #[test]
    fn test_flags() {
        let args =
            Args::try_parse_from(["tmon", "--config", "/tmp/x.toml", "-i", "250", "--plain"])
                .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/tmp/x.toml")));
        assert_eq!(args.interval, Some(250));
        assert!(args.plain);
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(Args::try_parse_from(["tmon", "--interval", "0"]).is_err());
    }

    #[test]
    fn test_help_lists_keybinds() {
        let help = Args::command().render_long_help().to_string();
        assert!(help.contains("Toggle battery"));
    }
}
