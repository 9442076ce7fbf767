use std::path::{Path, PathBuf};

use convert_case::{Case, Casing};
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprLit, Lit, Meta, Token};

use crate::parser::AnnotationError;

/// 携带注解字符串的属性名
pub const TAG_ATTR: &str = "tag";

/// 提取字段的注解，支持 `#[tag = "..."]` 和 `#[cfg_attr(<条件>, tag = "...")]`，
/// 没有该属性时返回 `None`
pub fn extract_tag(attrs: &[Attribute]) -> Option<Result<String, AnnotationError>> {
    attrs.iter().find_map(|attr| {
        if attr.path().is_ident(TAG_ATTR) {
            return Some(tag_value(&attr.meta));
        }
        if attr.path().is_ident("cfg_attr") {
            // 第一项是 cfg 条件，其余才是属性
            let metas = attr
                .parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
                .ok()?;
            return metas
                .iter()
                .skip(1)
                .find(|meta| meta.path().is_ident(TAG_ATTR))
                .map(tag_value);
        }
        None
    })
}

fn tag_value(meta: &Meta) -> Result<String, AnnotationError> {
    match meta {
        Meta::NameValue(meta) => match &meta.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(lit_str),
                ..
            }) => Ok(lit_str.value()),
            _ => Err(AnnotationError::NotAString),
        },
        _ => Err(AnnotationError::NotAString),
    }
}

/// 常量名前缀，`UserProfile` -> `USER_PROFILE`
pub fn const_prefix(type_name: &str) -> String {
    type_name.to_case(Case::Constant)
}

/// 生成文件路径：在扩展名之前插入后缀，`user.rs` -> `user_generated.rs`
pub fn generated_path(file: &Path, suffix: &str) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = file
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "rs".to_string());
    file.with_file_name(format!("{stem}{suffix}.{ext}"))
}

/// 用于比较的路径：父目录规范化后再拼上文件名，目录不存在时原样返回
pub fn resolve_path(path: &Path) -> PathBuf {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    match (dir.canonicalize(), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

/// 源文件对应的模块名
pub fn module_name(file: &Path) -> Option<String> {
    file.file_stem().map(|s| s.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(src: &str) -> syn::Field {
        let item: syn::ItemStruct = syn::parse_str(&format!("struct S {{ {src} }}")).unwrap();
        item.fields.into_iter().next().unwrap()
    }

    #[test]
    fn extracts_string_tag() {
        let f = field(r##"#[tag = r#"db:"id",gen:"bigint""#] id: i64"##);
        assert_eq!(
            extract_tag(&f.attrs),
            Some(Ok(r#"db:"id",gen:"bigint""#.to_string()))
        );
    }

    #[test]
    fn extracts_tag_behind_cfg_attr() {
        let f = field(r##"#[cfg_attr(model_maker, tag = r#"db:"id",gen:"bigint""#)] id: i64"##);
        assert_eq!(
            extract_tag(&f.attrs),
            Some(Ok(r#"db:"id",gen:"bigint""#.to_string()))
        );

        let f = field(r##"#[cfg_attr(feature = "sql", serde(skip), tag = "db:\"name\"")] name: String"##);
        assert_eq!(extract_tag(&f.attrs), Some(Ok(r#"db:"name""#.to_string())));

        let f = field(r##"#[cfg_attr(model_maker, tag = 1)] id: i64"##);
        assert_eq!(extract_tag(&f.attrs), Some(Err(AnnotationError::NotAString)));
    }

    #[test]
    fn cfg_attr_without_tag_is_ignored() {
        let f = field("#[cfg_attr(test, derive(Debug))] #[cfg_attr(tag, allow(dead_code))] id: i64");
        assert_eq!(extract_tag(&f.attrs), None);
    }

    #[test]
    fn untagged_field_has_no_annotation() {
        let f = field("#[serde(skip)] /// docs\n cache: u8");
        assert_eq!(extract_tag(&f.attrs), None);
    }

    #[test]
    fn non_string_tag_is_rejected() {
        assert_eq!(
            extract_tag(&field("#[tag = 1] id: i64").attrs),
            Some(Err(AnnotationError::NotAString))
        );
        assert_eq!(
            extract_tag(&field("#[tag(db = \"id\")] id: i64").attrs),
            Some(Err(AnnotationError::NotAString))
        );
    }

    #[test]
    fn const_prefix_is_screaming_snake() {
        assert_eq!(const_prefix("User"), "USER");
        assert_eq!(const_prefix("UserProfile"), "USER_PROFILE");
    }

    #[test]
    fn generated_path_inserts_suffix_before_extension() {
        assert_eq!(
            generated_path(Path::new("src/model/user.rs"), "_generated"),
            PathBuf::from("src/model/user_generated.rs")
        );
        assert_eq!(
            generated_path(Path::new("user"), "_dao"),
            PathBuf::from("user_dao.rs")
        );
    }

    #[test]
    fn module_name_is_file_stem() {
        assert_eq!(module_name(Path::new("src/user.rs")).as_deref(), Some("user"));
    }

    #[test]
    fn resolve_path_sees_through_relative_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("model")).unwrap();

        assert_eq!(
            resolve_path(&dir.path().join("model/../model/user.rs")),
            resolve_path(&dir.path().join("model/user.rs"))
        );
        assert_eq!(
            resolve_path(Path::new("missing/dir/user.rs")),
            PathBuf::from("missing/dir/user.rs")
        );
    }
}
