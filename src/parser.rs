use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::reader::SourceField;

/// 表示排除字段的列名
pub const SENTINEL: &str = "-";

/// 外键列名前缀，`id_user` 引用 `user(id)`
const FOREIGN_PREFIX: &str = "id_";

/// 注解语法错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnnotationError {
    #[error("`#[tag]` value must be a string literal")]
    NotAString,
    #[error("field name is not a Rust identifier")]
    InvalidFieldName,
    #[error("missing `db:\"...\"` column name")]
    MissingColumn,
    #[error("invalid column name `{0}`")]
    InvalidColumn(String),
    #[error("expected `:\"` after `{0}`")]
    MissingQuote(String),
    #[error("unterminated quoted value for `{0}`")]
    Unterminated(String),
    #[error("`gen` is missing the SQL type")]
    MissingType,
    #[error("unbalanced parentheses in `gen`")]
    UnbalancedParens,
    #[error("unknown `gen` option `{0}`")]
    UnknownOption(String),
    #[error("`default(...)` given more than once")]
    DuplicateDefault,
}

/// `gen` 中的单个选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenOption {
    AutoIncrement,
    NotNull,
    Primary,
    Unique,
    Index,
    Default(String),
}

impl GenOption {
    /// 解析类型之后的单个选项
    pub fn parse(token: &str) -> std::result::Result<Self, AnnotationError> {
        let option = match token {
            "autoincrement" => GenOption::AutoIncrement,
            "notnull" => GenOption::NotNull,
            "primary" => GenOption::Primary,
            "unique" => GenOption::Unique,
            "index" => GenOption::Index,
            _ => {
                let expr = token
                    .strip_prefix("default(")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .filter(|expr| !expr.trim().is_empty())
                    .ok_or_else(|| AnnotationError::UnknownOption(token.to_string()))?;
                GenOption::Default(expr.to_string())
            }
        };
        Ok(option)
    }
}

/// 表示一个列的解析结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Field {
    /// 声明中的字段名
    pub source: String,
    /// 列名，取自 `db`
    pub name: String,
    pub sql_type: String,
    pub default: Option<String>,
    pub not_null: bool,
    pub unique: bool,
    pub auto_increment: bool,
    pub primary: bool,
    pub index: bool,
    /// 外键引用的表，由列名推断
    pub foreign_table: Option<String>,
}

impl Field {
    /// 解析单个注解字符串，哨兵列名返回 `None`
    pub fn parse(raw: &str) -> std::result::Result<Option<Field>, AnnotationError> {
        let mut name = None;
        let mut gen = None;
        for pair in Pairs::new(raw) {
            match pair? {
                ("db", SENTINEL) => return Ok(None),
                ("db", value) => name = Some(value),
                ("gen", value) => gen = Some(value),
                _ => {}
            }
        }
        let name = name.ok_or(AnnotationError::MissingColumn)?;

        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(AnnotationError::InvalidColumn(name.to_string()));
        }

        let mut field = Field {
            name: name.to_string(),
            foreign_table: name
                .strip_prefix(FOREIGN_PREFIX)
                .filter(|table| !table.is_empty())
                .map(str::to_string),
            ..Field::default()
        };

        if let Some(gen) = gen {
            field.apply_gen(gen)?;
        }

        Ok(Some(field))
    }

    fn apply_gen(&mut self, gen: &str) -> std::result::Result<(), AnnotationError> {
        let mut tokens = split_top_level(gen)?.into_iter();
        self.sql_type = tokens
            .next()
            .filter(|ty| !ty.is_empty())
            .ok_or(AnnotationError::MissingType)?
            .to_string();

        for token in tokens {
            match GenOption::parse(token)? {
                GenOption::AutoIncrement => self.auto_increment = true,
                GenOption::NotNull => self.not_null = true,
                GenOption::Primary => self.primary = true,
                GenOption::Unique => self.unique = true,
                GenOption::Index => self.index = true,
                GenOption::Default(expr) => {
                    if self.default.replace(expr).is_some() {
                        return Err(AnnotationError::DuplicateDefault);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn is_foreign(&self) -> bool {
        self.foreign_table.is_some()
    }
}

/// 表示一张表的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Table {
    /// 按声明顺序构建表，并校验有且只有一个主键
    pub fn build(name: &str, sources: &[SourceField]) -> Result<Table> {
        let mut fields = Vec::new();
        for source in sources {
            let Some(raw) = &source.annotation else {
                log::debug!("field `{}` has no annotation, skipped", source.name);
                continue;
            };
            let parsed = Field::parse(raw).map_err(|err| Error::MalformedAnnotation {
                field: source.name.clone(),
                source: err,
            })?;
            match parsed {
                Some(_) if syn::parse_str::<syn::Ident>(&source.name).is_err() => {
                    return Err(Error::MalformedAnnotation {
                        field: source.name.clone(),
                        source: AnnotationError::InvalidFieldName,
                    });
                }
                Some(field) => {
                    log::debug!("field `{}` -> column `{}`", source.name, field.name);
                    fields.push(Field {
                        source: source.name.clone(),
                        ..field
                    });
                }
                None => log::debug!("field `{}` excluded by `db:\"-\"`", source.name),
            }
        }

        let table = Table {
            name: name.to_string(),
            fields,
        };
        table.warn_duplicates();
        table.warn_untyped();
        table.check_primary()?;
        Ok(table)
    }

    /// 主键列，`build` 保证其存在
    pub fn primary(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.primary)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    fn check_primary(&self) -> Result<()> {
        let primaries: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.primary)
            .map(|f| f.name.as_str())
            .collect();
        let reason = match primaries.as_slice() {
            [_] => return Ok(()),
            [] => "no primary key; mark exactly one column `primary`".to_string(),
            many => format!("multiple primary keys: {}", many.join(", ")),
        };
        Err(Error::InvalidTable {
            table: self.name.clone(),
            reason,
        })
    }

    fn warn_untyped(&self) {
        for field in self.fields.iter().filter(|f| f.sql_type.is_empty()) {
            log::warn!("column `{}` in `{}` has no SQL type", field.name, self.name);
        }
    }

    fn warn_duplicates(&self) {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                log::warn!("column `{}` declared more than once in `{}`", field.name, self.name);
            }
        }
    }
}

/// 逐个读取 `key:"value"` 对，键之间以空白或逗号分隔
struct Pairs<'a> {
    rest: &'a str,
}

impl<'a> Pairs<'a> {
    fn new(raw: &'a str) -> Self {
        Pairs { rest: raw }
    }
}

impl<'a> Iterator for Pairs<'a> {
    type Item = std::result::Result<(&'a str, &'a str), AnnotationError>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self
            .rest
            .trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            return None;
        }
        // 出错后不再继续读取
        self.rest = "";

        let Some(colon) = rest.find(':') else {
            return Some(Err(AnnotationError::MissingQuote(rest.trim().to_string())));
        };
        let key = rest[..colon].trim();
        let Some(value) = rest[colon + 1..].strip_prefix('"') else {
            return Some(Err(AnnotationError::MissingQuote(key.to_string())));
        };
        let Some(end) = value.find('"') else {
            return Some(Err(AnnotationError::Unterminated(key.to_string())));
        };
        self.rest = &value[end + 1..];
        Some(Ok((key, &value[..end])))
    }
}

/// 在括号外的逗号处拆分
fn split_top_level(gen: &str) -> std::result::Result<Vec<&str>, AnnotationError> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in gen.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1).ok_or(AnnotationError::UnbalancedParens)?,
            ',' if depth == 0 => {
                tokens.push(gen[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(AnnotationError::UnbalancedParens);
    }
    tokens.push(gen[start..].trim());
    Ok(tokens)
}
