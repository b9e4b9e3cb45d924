// src/db/sql.rs
//
// Piezas comunes de QueryBuilder. Identificadores siempre estáticos; valores
// siempre ligados.

use sqlx::{Postgres, QueryBuilder};

use crate::common::fields::{push_value, Fields};
use crate::common::pagination::like_pattern;

/// `INSERT INTO <table> AS t (cols) VALUES (...)` o `DEFAULT VALUES`.
pub fn insert_into(table: &str, fields: Fields) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("INSERT INTO {} AS t ", table));
    if fields.is_empty() {
        qb.push("DEFAULT VALUES");
        return qb;
    }

    let values = fields.into_inner();
    qb.push("(");
    for (i, (name, _)) in values.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(*name);
    }
    qb.push(") VALUES (");
    for (i, (_, value)) in values.into_iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        push_value(&mut qb, value);
    }
    qb.push(")");
    qb
}

/// `col1 = $1, col2 = $2`
pub fn push_assignments(qb: &mut QueryBuilder<'static, Postgres>, fields: Fields) {
    for (i, (name, value)) in fields.into_inner().into_iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(name).push(" = ");
        push_value(qb, value);
    }
}

/// ` WHERE (e1 ILIKE $n OR e2 ILIKE $m ...)`
pub fn push_search(qb: &mut QueryBuilder<'static, Postgres>, expressions: &[&str], term: Option<&str>) {
    let Some(term) = term else {
        return;
    };
    if expressions.is_empty() {
        return;
    }
    let pattern = like_pattern(term);
    qb.push(" WHERE (");
    for (i, expr) in expressions.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(*expr).push(" ILIKE ").push_bind(pattern.clone());
    }
    qb.push(")");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::fields::{FieldKind, SqlValue};

    #[test]
    fn insert_lists_columns_in_order() {
        let mut fields = Fields::new();
        fields.set("nombre", SqlValue::Text("Guantes".into()));
        fields.set("marca", SqlValue::Null(FieldKind::Text));
        let qb = insert_into("insumos", fields);
        assert_eq!(qb.sql(), "INSERT INTO insumos AS t (nombre, marca) VALUES ($1, $2)");
    }

    #[test]
    fn empty_insert_uses_defaults() {
        let qb = insert_into("solicitudes", Fields::new());
        assert_eq!(qb.sql(), "INSERT INTO solicitudes AS t DEFAULT VALUES");
    }

    #[test]
    fn search_binds_one_pattern_per_expression() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM insumos t");
        push_search(&mut qb, &["t.nombre", "t.marca"], Some("lat"));
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM insumos t WHERE (t.nombre ILIKE $1 OR t.marca ILIKE $2)"
        );
    }

    #[test]
    fn assignments() {
        let mut fields = Fields::new();
        fields.set("nombre", SqlValue::Text("x".into()));
        fields.set("marca", SqlValue::Text("y".into()));
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE insumos AS t SET ");
        push_assignments(&mut qb, fields);
        assert_eq!(qb.sql(), "UPDATE insumos AS t SET nombre = $1, marca = $2");
    }
}
