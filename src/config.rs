use std::path::PathBuf;

use clap::Parser;

use crate::error::{Error, Result};
use crate::utils::module_name;

pub const DEFAULT_SUFFIX: &str = "_generated";
pub const DEFAULT_RUNTIME: &str = "easydb";

/// 命令行参数
#[derive(Debug, Parser)]
#[command(
    name = "model_maker",
    about = "Generate a CREATE TABLE statement and data access code from an annotated struct",
    version
)]
pub struct Args {
    /// Path to the Rust source containing the struct
    #[arg(long)]
    pub file: Option<String>,

    /// Name of the struct
    #[arg(long = "struct")]
    pub struct_name: Option<String>,

    /// Name of the SQL table
    #[arg(long)]
    pub table: Option<String>,

    /// Path of the generated SQL file; skipped when empty
    #[arg(long)]
    pub sql: Option<String>,

    /// Suffix inserted before the extension of the generated file
    #[arg(long, default_value = DEFAULT_SUFFIX)]
    pub suffix: String,

    /// Module that declares the struct, defaults to the file stem
    #[arg(long)]
    pub module: Option<String>,

    /// Path of the data access library used by the generated code
    #[arg(long, default_value = DEFAULT_RUNTIME)]
    pub runtime: String,
}

/// 一次生成所需的全部参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub file: PathBuf,
    pub type_name: String,
    pub table: String,
    pub sql: Option<PathBuf>,
    pub suffix: String,
    pub module: String,
    pub runtime: String,
}

impl Config {
    /// 校验必填参数
    pub fn from_args(args: Args) -> Result<Config> {
        let file = PathBuf::from(required("file", args.file)?);
        let type_name = required("struct", args.struct_name)?;
        let table = required("table", args.table)?;

        let module = match args.module.filter(|m| !m.is_empty()) {
            Some(module) => module,
            None => module_name(&file).ok_or_else(|| Error::InvalidArgument {
                name: "file",
                reason: format!("cannot derive a module name from {}", file.display()),
            })?,
        };

        if args.suffix.is_empty() || args.suffix.contains(['/', '\\']) {
            return Err(Error::InvalidArgument {
                name: "suffix",
                reason: format!("`{}` would not name a separate file next to the source", args.suffix),
            });
        }

        Ok(Config {
            file,
            type_name,
            table,
            sql: args.sql.filter(|p| !p.is_empty()).map(PathBuf::from),
            suffix: args.suffix,
            module,
            runtime: args.runtime,
        })
    }
}

fn required(name: &'static str, value: Option<String>) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(Error::MissingArgument(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(argv: &[&str]) -> Result<Config> {
        let args = Args::try_parse_from(std::iter::once("model_maker").chain(argv.iter().copied()))
            .unwrap();
        Config::from_args(args)
    }

    #[test]
    fn defaults() {
        let config = config(&["--file", "model/user.rs", "--struct", "User", "--table", "user"])
            .unwrap();
        assert_eq!(
            config,
            Config {
                file: "model/user.rs".into(),
                type_name: "User".into(),
                table: "user".into(),
                sql: None,
                suffix: "_generated".into(),
                module: "user".into(),
                runtime: "easydb".into(),
            }
        );
    }

    #[test]
    fn all_flags() {
        let config = config(&[
            "--file", "user.rs", "--struct", "User", "--table", "users", "--sql", "user.sql",
            "--suffix", "_dao", "--module", "models", "--runtime", "crate::db",
        ])
        .unwrap();
        assert_eq!(config.sql, Some(PathBuf::from("user.sql")));
        assert_eq!(config.suffix, "_dao");
        assert_eq!(config.module, "models");
        assert_eq!(config.runtime, "crate::db");
    }

    #[test]
    fn empty_sql_skips_ddl() {
        let config = config(&["--file", "user.rs", "--struct", "User", "--table", "user", "--sql", ""])
            .unwrap();
        assert_eq!(config.sql, None);
    }

    #[test]
    fn missing_or_empty_required_flags() {
        let cases: [(&[&str], &str); 4] = [
            (&["--struct", "User", "--table", "user"], "file"),
            (&["--file", "user.rs", "--table", "user"], "struct"),
            (&["--file", "user.rs", "--struct", "User"], "table"),
            (&["--file", "user.rs", "--struct", "User", "--table", ""], "table"),
        ];
        for (argv, flag) in cases {
            match config(argv) {
                Err(Error::MissingArgument(name)) => assert_eq!(name, flag),
                other => panic!("unexpected result for {argv:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn suffix_must_name_a_separate_file() {
        for suffix in ["", "/out", "..\\x"] {
            match config(&["--file", "user.rs", "--struct", "User", "--table", "user", "--suffix", suffix]) {
                Err(Error::InvalidArgument { name, .. }) => assert_eq!(name, "suffix"),
                other => panic!("unexpected result for {suffix:?}: {other:?}"),
            }
        }
    }
}
