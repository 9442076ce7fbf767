use crate::parser::{Field, Table};

/// 查询语句中供调用方插入条件的位置
pub const CONDITION_MARKER: &str = "/*condition*/";

/// 生成单个列的定义，以及紧随其后的主键、外键、索引子句
fn generate_column_clauses(field: &Field) -> Vec<String> {
    let mut column = field.name.clone();

    if !field.sql_type.is_empty() {
        column.push_str(&format!(" {}", field.sql_type));
    }

    if field.auto_increment {
        column.push_str(" AUTO_INCREMENT");
    }
    if field.not_null {
        column.push_str(" NOT NULL");
    }
    if let Some(default) = &field.default {
        column.push_str(&format!(" DEFAULT {}", default));
    }
    if field.unique {
        column.push_str(" UNIQUE");
    }

    let mut clauses = vec![column];
    if field.primary {
        clauses.push(format!("PRIMARY KEY({})", field.name));
    }
    if let Some(foreign_table) = &field.foreign_table {
        clauses.push(format!(
            "CONSTRAINT FOREIGN KEY ({}) REFERENCES {}(id)",
            field.name, foreign_table
        ));
    }
    if field.index {
        clauses.push(format!("INDEX({})", field.name));
    }
    clauses
}

/// 生成创建表的SQL语句
pub fn generate_create_table_sql(table: &Table) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", table.name);

    let clauses: Vec<String> = table
        .fields
        .iter()
        .flat_map(generate_column_clauses)
        .map(|clause| format!("\t{}", clause))
        .collect();

    sql.push_str(&clauses.join(",\n"));
    sql.push_str("\n);\n");
    sql
}

/// 生成统计行数的SQL语句
pub fn generate_count_sql(table: &Table) -> String {
    format!("SELECT COUNT(*) FROM {}", table.name)
}

/// 生成查询所有列的SQL语句，末尾保留条件插入位置
pub fn generate_select_sql(table: &Table) -> String {
    format!(
        "SELECT {} FROM {} {}",
        table.column_names().join(", "),
        table.name,
        CONDITION_MARKER
    )
}

/// 生成插入记录的SQL语句
pub fn generate_insert_sql(table: &Table) -> String {
    let columns = table.column_names().join(", ");

    let placeholders = table
        .fields
        .iter()
        .map(|f| format!(":{}", f.name))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.name, columns, placeholders
    )
}

/// 生成按主键更新记录的SQL语句
pub fn generate_update_sql(table: &Table) -> String {
    let set_clauses = table
        .fields
        .iter()
        .filter(|f| !f.primary)
        .map(|f| format!("{} = :{}", f.name, f.name))
        .collect::<Vec<_>>()
        .join(", ");

    let where_clause = table
        .primary()
        .map(|f| format!("{} = :{}", f.name, f.name))
        .unwrap_or_default();

    format!(
        "UPDATE {} SET {} WHERE {}",
        table.name, set_clauses, where_clause
    )
}
