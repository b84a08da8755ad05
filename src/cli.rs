use std::path::PathBuf;

use clap::Parser;

use crate::output::{OutputFormat, OutputOptions, OutputTarget};
use crate::settings::Settings;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Convert proxy share links into Xray outbounds, Hysteria2 configs or links",
    long_about = None
)]
pub struct Args {
    #[arg(long, value_name = "LINK", help = "Parse a single share link")]
    pub parse: Option<String>,

    #[arg(long, value_name = "PATH", help = "Parse every link in a file, or a WireGuard config file")]
    pub file: Option<PathBuf>,

    #[arg(long, value_name = "URL", help = "Fetch and parse a subscription")]
    pub sub: Option<String>,

    #[arg(value_name = "LINK", help = "Share link to parse; links are read from stdin when nothing is given")]
    pub link: Option<String>,

    #[arg(short, long, value_enum, help = "Output format [default: json]")]
    pub format: Option<OutputFormat>,

    #[arg(short, long, value_name = "PATH", help = "Write output to a file")]
    pub output: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Write one file per profile into a directory")]
    pub dir: Option<PathBuf>,

    #[arg(long, help = "Name the output file after the profile remarks")]
    pub auto: bool,

    #[arg(short, long, help = "Local SOCKS/HTTP port of the Hysteria2 client [default: 1234]")]
    pub port: Option<u16>,

    #[arg(long, conflicts_with = "compact", help = "Pretty-print JSON output")]
    pub pretty: bool,

    #[arg(long, help = "Print JSON output on a single line")]
    pub compact: bool,

    #[arg(long, help = "Skip certificate verification when fetching subscriptions")]
    pub insecure: bool,

    #[arg(short, long, value_name = "PATH", help = "TOML settings file")]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Emit trace log")]
    pub verbose: bool,
}

/// What to read profiles from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Link(String),
    File(PathBuf),
    Subscription(String),
    Stdin,
}

impl Args {
    /// First of `--parse`, `--file`, `--sub` and the positional link; stdin
    /// when none is given
    pub fn input(&self) -> Input {
        if let Some(link) = &self.parse {
            Input::Link(link.clone())
        } else if let Some(path) = &self.file {
            Input::File(path.clone())
        } else if let Some(url) = &self.sub {
            Input::Subscription(url.clone())
        } else if let Some(link) = &self.link {
            Input::Link(link.clone())
        } else {
            Input::Stdin
        }
    }

    /// Overrides file settings with the flags given on the command line
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(format) = self.format {
            settings.format = format;
        }
        if let Some(port) = self.port {
            settings.socks_port = port;
        }
        if self.pretty {
            settings.pretty = true;
        }
        if self.compact {
            settings.pretty = false;
        }
        if self.insecure {
            settings.insecure = true;
        }
        settings
    }

    pub fn output_options(settings: &Settings) -> OutputOptions {
        OutputOptions {
            format: settings.format,
            pretty: settings.pretty,
            local_port: settings.socks_port,
        }
    }

    pub fn output_target(&self) -> OutputTarget {
        OutputTarget {
            file: self.output.clone(),
            dir: self.dir.clone(),
            auto_name: self.auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("proxylink").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_input_precedence() {
        assert_eq!(args(&[]).input(), Input::Stdin);
        assert_eq!(args(&["vless://x"]).input(), Input::Link("vless://x".to_string()));
        assert_eq!(
            args(&["--sub", "https://sub.example.com", "vless://x"]).input(),
            Input::Subscription("https://sub.example.com".to_string())
        );
        assert_eq!(
            args(&["--parse", "ss://a", "--file", "links.txt"]).input(),
            Input::Link("ss://a".to_string())
        );
    }

    #[test]
    fn test_flags_override_settings() {
        let settings = Settings {
            format: OutputFormat::Uri,
            socks_port: 2080,
            ..Default::default()
        };

        let merged = args(&[]).apply(settings.clone());
        assert_eq!(merged, settings);

        let merged = args(&["--format", "hy2", "--port", "1080", "--compact", "--insecure"])
            .apply(settings);
        assert_eq!(merged.format, OutputFormat::Hy2);
        assert_eq!(merged.socks_port, 1080);
        assert!(!merged.pretty);
        assert!(merged.insecure);

        let options = Args::output_options(&merged);
        assert_eq!(options.local_port, 1080);
        assert!(!options.pretty);
    }

    #[test]
    fn test_pretty_conflicts_with_compact() {
        let result = Args::try_parse_from(["proxylink", "--pretty", "--compact"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_target() {
        let target = args(&["-o", "out.json", "--auto"]).output_target();
        assert_eq!(target.file, Some(PathBuf::from("out.json")));
        assert!(target.auto_name);
        assert!(target.dir.is_none());
    }
}
