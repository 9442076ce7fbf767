//! # model_maker
//!
//! 根据结构体字段上的注解生成建表语句和数据访问代码。
//!
//! ## 示例
//!
//! ```rust,ignore
//! pub struct User {
//!     #[cfg_attr(model_maker, tag = r#"db:"id",gen:"bigint,autoincrement,notnull,primary""#)]
//!     pub id: i64,
//!     #[cfg_attr(model_maker, tag = r#"db:"name",gen:"varchar(512),notnull""#)]
//!     pub name: String,
//!     #[cfg_attr(model_maker, tag = r#"db:"-""#)]
//!     pub cache: Option<String>,
//! }
//! ```
//!
//! `model_maker` 这个 cfg 从不启用，编译器不会看到 `tag` 属性；只读语法树的本工具仍能读到。
//! 需要消除 `unexpected_cfgs` 警告时在 `Cargo.toml` 中加入
//! `[lints.rust] unexpected_cfgs = { level = "warn", check-cfg = ["cfg(model_maker)"] }`。
//! 也接受裸写的 `#[tag = "..."]`，适用于不参与编译的声明文件。
//!
//! ```text
//! model_maker --file src/user.rs --struct User --table user --sql user.sql
//! ```
//!
//! # 注解
//!
//! - `db:"<列名>"`: 列名，`-` 表示排除该字段
//! - `gen:"<类型>,<选项>,..."`: SQL类型及 `autoincrement`、`notnull`、`primary`、
//!   `unique`、`index`、`default(<表达式>)`
//! - 列名为 `id_<表名>` 时自动生成引用 `<表名>(id)` 的外键
//!
//! # 生成内容
//!
//! - `CREATE TABLE` 语句（指定 `--sql` 时写入）
//! - `<TYPE>_COUNT`、`<TYPE>_SELECT`、`<TYPE>_UPDATE`、`<TYPE>_INSERT` 查询常量
//! - `select_limit`、`count`、`insert`、`update` 方法

pub mod code_generator;
pub mod config;
pub mod error;
pub mod parser;
pub mod reader;
pub mod sql_generator;
pub mod utils;
pub mod writer;

use std::path::{Path, PathBuf};

pub use code_generator::CodegenContext;
pub use config::{Args, Config};
pub use error::{Error, Result};
pub use parser::{Field, Table};
pub use reader::{Declaration, DeclarationSource, RustSource, SourceField};

/// 一次生成的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub ddl: String,
    pub source: String,
}

/// 写出的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub sql: Option<PathBuf>,
    pub source: PathBuf,
}

/// 由声明生成建表语句和数据访问代码
pub fn generate(config: &Config, declaration: &Declaration) -> Result<Generated> {
    let origin = config
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ctx = CodegenContext::new(&declaration.type_name, &config.module, &config.runtime, &origin)?;

    let table = Table::build(&config.table, &declaration.fields)?;
    log::debug!("table `{}` has {} columns", table.name, table.fields.len());

    Ok(Generated {
        ddl: sql_generator::generate_create_table_sql(&table),
        source: code_generator::generate_source_file(&table, &ctx),
    })
}

/// 读取源文件、生成并写出结果
pub fn run(config: &Config) -> Result<Outcome> {
    let source = RustSource::open(&config.file)?;
    let declaration = source.declaration(&config.type_name)?;
    let source_path = utils::generated_path(&config.file, &config.suffix);
    check_outputs(config, &source_path)?;
    let generated = generate(config, &declaration)?;

    let mut files = Vec::with_capacity(2);
    if let Some(sql) = &config.sql {
        files.push((sql.as_path(), generated.ddl.as_str()));
    }
    files.push((source_path.as_path(), generated.source.as_str()));
    writer::write_all_atomic(&files)?;

    Ok(Outcome {
        sql: config.sql.clone(),
        source: source_path,
    })
}

/// 输出文件不能覆盖输入文件，两个输出也不能是同一个文件
fn check_outputs(config: &Config, source_path: &Path) -> Result<()> {
    let input = utils::resolve_path(&config.file);
    let source = utils::resolve_path(source_path);
    if source == input {
        return Err(Error::InvalidArgument {
            name: "suffix",
            reason: format!("generated file would overwrite {}", config.file.display()),
        });
    }
    if let Some(sql) = &config.sql {
        let sql = utils::resolve_path(sql);
        if sql == input || sql == source {
            return Err(Error::InvalidArgument {
                name: "sql",
                reason: format!("{} is already used as input or generated source", sql.display()),
            });
        }
    }
    Ok(())
}
