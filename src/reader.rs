use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use syn::{Fields, Item};

use crate::error::{Error, Result};
use crate::utils::extract_tag;

/// 声明中的一个字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceField {
    pub name: String,
    /// 原始注解字符串，未标注的字段为 `None`
    pub annotation: Option<String>,
}

/// 一个类型声明的字段列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub type_name: String,
    pub fields: Vec<SourceField>,
}

/// 按名称查找类型声明
pub trait DeclarationSource {
    fn declaration(&self, type_name: &str) -> Result<Declaration>;
}

/// 基于 `syn` 的 Rust 源文件读取器
pub struct RustSource {
    path: PathBuf,
    file: syn::File,
}

impl RustSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
            _ => Error::io(path, err),
        })?;
        Self::parse_str(path, &content)
    }

    /// 解析内存中的源码，`path` 仅用于错误信息
    pub fn parse_str(path: impl Into<PathBuf>, content: &str) -> Result<Self> {
        let path = path.into();
        let file = syn::parse_file(content).map_err(|source| Error::SourceParse {
            path: path.clone(),
            source,
        })?;
        Ok(RustSource { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DeclarationSource for RustSource {
    fn declaration(&self, type_name: &str) -> Result<Declaration> {
        let item = self
            .file
            .items
            .iter()
            .find_map(|item| match item {
                Item::Struct(item) if item.ident == type_name => Some(item),
                _ => None,
            })
            .ok_or_else(|| Error::TypeNotFound {
                name: type_name.to_string(),
                path: self.path.clone(),
            })?;

        let named: Vec<&syn::Field> = match &item.fields {
            Fields::Named(fields) => fields.named.iter().collect(),
            _ => Vec::new(),
        };

        let mut fields = Vec::with_capacity(named.len());
        for field in named {
            let Some(ident) = &field.ident else { continue };
            let name = ident.to_string();
            let annotation = extract_tag(&field.attrs)
                .transpose()
                .map_err(|source| Error::MalformedAnnotation {
                    field: name.clone(),
                    source,
                })?;
            fields.push(SourceField { name, annotation });
        }

        log::debug!(
            "found `{}` in {} with {} fields",
            type_name,
            self.path.display(),
            fields.len()
        );
        Ok(Declaration {
            type_name: type_name.to_string(),
            fields,
        })
    }
}
