//! Command line flags. The program normally runs with none (from cron).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CliError {
    #[error("{0} needs a path argument")]
    MissingValue(&'static str),

    #[error("unknown argument '{0}' (try --help)")]
    Unknown(String),
}

pub const USAGE: &str = "\
Usage: harbour-tides [OPTIONS]

Options:
  --stdout               Print the HTML instead of writing and publishing it
  --no-publish           Write the HTML file but skip the SFTP upload
  --config <PATH>        Read configuration from PATH (default: tide-report.toml)
  --write-config <PATH>  Write the effective configuration to PATH and exit
                         (API keys and password are left blank)
  -h, --help             Show this help";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub stdout: bool,
    pub no_publish: bool,
    pub help: bool,
    pub config_path: Option<PathBuf>,
    pub write_config: Option<PathBuf>,
}

impl CliArgs {
    pub fn parse<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--stdout" => parsed.stdout = true,
                "--no-publish" => parsed.no_publish = true,
                "-h" | "--help" => parsed.help = true,
                "--config" => {
                    let path = args.next().ok_or(CliError::MissingValue("--config"))?;
                    parsed.config_path = Some(PathBuf::from(path));
                }
                "--write-config" => {
                    let path = args
                        .next()
                        .ok_or(CliError::MissingValue("--write-config"))?;
                    parsed.write_config = Some(PathBuf::from(path));
                }
                _ => return Err(CliError::Unknown(arg)),
            }
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs, CliError> {
        CliArgs::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_arguments_means_full_run() {
        assert_eq!(parse(&[]).unwrap(), CliArgs::default());
    }

    #[test]
    fn flags_and_paths() {
        let args = parse(&["--no-publish", "--config", "alt.toml"]).unwrap();
        assert!(args.no_publish);
        assert!(!args.stdout);
        assert_eq!(args.config_path, Some(PathBuf::from("alt.toml")));
    }

    #[test]
    fn missing_path_is_an_error() {
        assert_eq!(
            parse(&["--config"]),
            Err(CliError::MissingValue("--config"))
        );
    }

    #[test]
    fn unknown_flag_is_an_error() {
        assert_eq!(
            parse(&["--verbose"]),
            Err(CliError::Unknown("--verbose".into()))
        );
    }
}
