use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Ident, Path};

use crate::error::{Error, Result};
use crate::parser::Table;
use crate::sql_generator::{
    generate_count_sql,
    generate_insert_sql,
    generate_select_sql,
    generate_update_sql,
};
use crate::utils::const_prefix;

/// 生成代码所需的上下文
#[derive(Debug, Clone)]
pub struct CodegenContext {
    pub type_name: Ident,
    /// 类型所在模块，生成 `use super::<module>::<Type>`
    pub module: Ident,
    /// 数据访问库的路径
    pub runtime: Path,
    /// 源文件名，写入文件头
    pub origin: String,
}

impl CodegenContext {
    pub fn new(type_name: &str, module: &str, runtime: &str, origin: &str) -> Result<Self> {
        Ok(CodegenContext {
            type_name: parse_arg("struct", type_name)?,
            module: parse_arg("module", module)?,
            runtime: parse_arg("runtime", runtime)?,
            origin: origin.to_string(),
        })
    }
}

fn parse_arg<T: syn::parse::Parse>(name: &'static str, value: &str) -> Result<T> {
    syn::parse_str(value).map_err(|err| Error::InvalidArgument {
        name,
        reason: format!("`{}`: {}", value, err),
    })
}

/// 四条查询语句常量的名字
struct QueryNames {
    count: Ident,
    select: Ident,
    update: Ident,
    insert: Ident,
}

impl QueryNames {
    fn new(ctx: &CodegenContext) -> Self {
        let prefix = const_prefix(&ctx.type_name.to_string());
        QueryNames {
            count: format_ident!("{}_COUNT", prefix),
            select: format_ident!("{}_SELECT", prefix),
            update: format_ident!("{}_UPDATE", prefix),
            insert: format_ident!("{}_INSERT", prefix),
        }
    }
}

/// 生成查询语句常量
fn generate_consts(table: &Table, names: &QueryNames) -> TokenStream {
    let QueryNames {
        count,
        select,
        update,
        insert,
    } = names;

    let count_sql = generate_count_sql(table);
    let select_sql = generate_select_sql(table);
    let update_sql = generate_update_sql(table);
    let insert_sql = generate_insert_sql(table);

    quote! {
        /// 统计行数
        pub const #count: &str = #count_sql;
        /// 查询所有列，条件插入在 `/*condition*/` 处
        pub const #select: &str = #select_sql;
        /// 按主键更新
        pub const #update: &str = #update_sql;
        /// 插入记录
        pub const #insert: &str = #insert_sql;
    }
}

/// 生成限制条数的查询方法
fn generate_select_limit_method(ctx: &CodegenContext, names: &QueryNames) -> TokenStream {
    let type_name = &ctx.type_name;
    let select = &names.select;

    quote! {
        /// 查询至多 `limit` 条记录
        pub fn select_limit(db: &Db, limit: i64) -> Result<Vec<#type_name>> {
            let query = condition(#select, " LIMIT ? ");
            db.select(&query, &[&limit])
        }
    }
}

/// 生成统计方法
fn generate_count_method(names: &QueryNames) -> TokenStream {
    let count = &names.count;

    quote! {
        /// 统计记录数
        pub fn count(db: &Db) -> Result<i64> {
            db.get(#count, &[])
        }
    }
}

/// 生成插入方法，自增主键在插入后回写
fn generate_insert_method(table: &Table, names: &QueryNames) -> TokenStream {
    let insert = &names.insert;

    let exec = match table.primary() {
        Some(pk) if pk.auto_increment => {
            let pk_field = format_ident!("{}", pk.source);
            quote! {
                let res = db.named_exec(#insert, self)?;
                self.#pk_field = res.last_insert_id()?;
            }
        }
        _ => quote! {
            db.named_exec(#insert, self)?;
        },
    };

    quote! {
        /// 插入记录
        pub fn insert(&mut self, db: &Db) -> Result<()> {
            #exec
            Ok(())
        }
    }
}

/// 生成按主键更新的方法
fn generate_update_method(names: &QueryNames) -> TokenStream {
    let update = &names.update;

    quote! {
        /// 按主键更新记录
        pub fn update(&self, db: &Db) -> Result<()> {
            db.named_exec(#update, self)?;
            Ok(())
        }
    }
}

/// 生成所有数据访问方法
fn generate_impl_block(table: &Table, ctx: &CodegenContext, names: &QueryNames) -> TokenStream {
    let type_name = &ctx.type_name;

    let select_limit_method = generate_select_limit_method(ctx, names);
    let count_method = generate_count_method(names);
    let insert_method = generate_insert_method(table, names);
    let update_method = generate_update_method(names);

    quote! {
        impl #type_name {
            #select_limit_method
            #count_method
            #insert_method
            #update_method
        }
    }
}

/// 生成完整的数据访问源文件
pub fn generate_source_file(table: &Table, ctx: &CodegenContext) -> String {
    let names = QueryNames::new(ctx);
    let CodegenContext {
        type_name,
        module,
        runtime,
        origin,
    } = ctx;

    let header = format!(
        " `{}` 的数据访问代码，由 `{}` 生成，请勿手动修改。",
        type_name, origin
    );
    let consts = generate_consts(table, &names);
    let impl_block = generate_impl_block(table, ctx, &names);

    let file: syn::File = syn::parse_quote! {
        #![doc = #header]

        use #runtime::{condition, Db, Result};
        use super::#module::#type_name;

        #consts

        #impl_block
    };
    prettyplease::unparse(&file)
}
