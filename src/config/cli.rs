use pico_args::Arguments;

use crate::config::ConfigError;
use crate::core::mode::InteractionMode;

pub const HELP: &str = "\
Lzv: 可缩放 / 可平移的图片查看器

用法:
  lzv [选项] [图片路径]

选项:
  --mode <center|pan>     交互模式（默认读取配置，初始为 center）
  --log-level <级别>      error / warn / info / debug / trace，RUST_LOG 优先
  -h, --help              显示帮助
";

/// 命令行启动参数，未给出的项沿用 runtime.json 中的配置
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchOptions {
    pub help: bool,
    pub image: Option<String>,
    pub mode: Option<InteractionMode>,
    pub log_level: Option<log::LevelFilter>,
}

impl LaunchOptions {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::parse(Arguments::from_env())
    }

    pub fn parse(mut args: Arguments) -> Result<Self, ConfigError> {
        let help = args.contains(["-h", "--help"]);
        let mode = args.opt_value_from_str("--mode")?;
        let log_level = args.opt_value_from_str("--log-level")?;
        let image = args.opt_free_from_str()?;

        let rest = args.finish();
        if !rest.is_empty() {
            let joined = rest
                .iter()
                .map(|a| a.to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join(" ");
            return Err(ConfigError::UnexpectedArgs(joined));
        }

        Ok(Self {
            help,
            image,
            mode,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;

    fn parse(args: &[&str]) -> Result<LaunchOptions, ConfigError> {
        LaunchOptions::parse(Arguments::from_vec(
            args.iter().map(OsString::from).collect(),
        ))
    }

    #[test]
    fn empty_command_line_uses_config() {
        assert_eq!(parse(&[]).unwrap(), LaunchOptions::default());
    }

    #[test]
    fn full_command_line() {
        let options = parse(&["--mode", "pan", "--log-level", "debug", "cat.png"]).unwrap();
        assert_eq!(options.mode, Some(InteractionMode::DragPan));
        assert_eq!(options.log_level, Some(log::LevelFilter::Debug));
        assert_eq!(options.image.as_deref(), Some("cat.png"));
        assert!(!options.help);
    }

    #[test]
    fn help_flag() {
        assert!(parse(&["-h"]).unwrap().help);
    }

    #[test]
    fn bad_mode_is_rejected() {
        assert!(matches!(parse(&["--mode", "spin"]), Err(ConfigError::Args(_))));
    }

    #[test]
    fn extra_positionals_are_rejected() {
        assert!(matches!(
            parse(&["a.png", "b.png"]),
            Err(ConfigError::UnexpectedArgs(rest)) if rest == "b.png"
        ));
    }
}
