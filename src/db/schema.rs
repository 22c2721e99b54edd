use anyhow::{Context, Result, anyhow};
use arrow::datatypes::{DataType, Schema as ArrowSchema};

use crate::formats::Value;

/// Field values from a delimited record, `None` where the source held a null token
pub type FieldValues = Vec<Option<String>>;

/// SQL data type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Real,
    DoublePrecision,
    Text,
    Date,
    Timestamp,
    TimestampTz,
}

impl SqlType {
    /// Returns the Postgres type name
    pub fn to_postgres(self) -> &'static str {
        match self {
            SqlType::Boolean => "BOOLEAN",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Real => "REAL",
            SqlType::DoublePrecision => "DOUBLE PRECISION",
            SqlType::Text => "TEXT",
            SqlType::Date => "DATE",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::TimestampTz => "TIMESTAMP WITH TIME ZONE",
        }
    }

    /// Map an Arrow data type to the column type used in the destination table
    pub fn from_arrow(data_type: &DataType) -> Result<Self> {
        Ok(match data_type {
            DataType::Boolean => SqlType::Boolean,
            DataType::Int8 | DataType::Int16 | DataType::UInt8 => SqlType::SmallInt,
            DataType::Int32 | DataType::UInt16 => SqlType::Integer,
            DataType::Int64 | DataType::UInt32 | DataType::UInt64 => SqlType::BigInt,
            DataType::Float32 => SqlType::Real,
            DataType::Float64 | DataType::Decimal128(_, _) => SqlType::DoublePrecision,
            DataType::Utf8
            | DataType::LargeUtf8
            | DataType::Utf8View
            | DataType::Binary
            | DataType::LargeBinary
            | DataType::Null => SqlType::Text,
            DataType::Date32 | DataType::Date64 => SqlType::Date,
            DataType::Timestamp(_, None) => SqlType::Timestamp,
            DataType::Timestamp(_, Some(_)) => SqlType::TimestampTz,
            other => {
                return Err(anyhow!("Unsupported column type: {:?}", other));
            }
        })
    }

    /// Find the most specific common type that accommodates both types
    pub fn common_type(self, other: SqlType) -> SqlType {
        if self == other {
            return self;
        }

        use SqlType::*;
        match (self, other) {
            (SmallInt | Integer | BigInt, Real | DoublePrecision)
            | (Real | DoublePrecision, SmallInt | Integer | BigInt) => DoublePrecision,
            (SmallInt, Integer) | (Integer, SmallInt) => Integer,
            (SmallInt | Integer, BigInt) | (BigInt, SmallInt | Integer) => BigInt,
            (Real, DoublePrecision) | (DoublePrecision, Real) => DoublePrecision,
            (Date, Timestamp) | (Timestamp, Date) => Timestamp,
            _ => Text,
        }
    }

    /// Parse a raw delimited field into a value of this type
    pub fn parse_field(self, raw: &str) -> Result<Value> {
        let trimmed = raw.trim();
        Ok(match self {
            SqlType::Boolean => Value::Bool(trimmed.eq_ignore_ascii_case("true")),
            SqlType::SmallInt | SqlType::Integer | SqlType::BigInt => Value::Int(
                trimmed
                    .parse()
                    .with_context(|| format!("Cannot convert '{}' to {}", raw, self.to_postgres()))?,
            ),
            SqlType::Real | SqlType::DoublePrecision => Value::Float(
                trimmed
                    .parse()
                    .with_context(|| format!("Cannot convert '{}' to {}", raw, self.to_postgres()))?,
            ),
            _ => Value::Text(raw.to_string()),
        })
    }
}

/// A column in a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub sql_type: SqlType,
}

/// A table schema (ordered collection of columns)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub columns: Vec<Column>,
}

impl Schema {
    /// Derive the destination schema from an Arrow schema
    pub fn from_arrow(schema: &ArrowSchema) -> Result<Self> {
        let columns = schema
            .fields()
            .iter()
            .map(|field| {
                let sql_type = SqlType::from_arrow(field.data_type())
                    .with_context(|| format!("Column '{}'", field.name()))?;
                Ok(Column {
                    name: field.name().clone(),
                    sql_type,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { columns })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Quote an identifier for use in SQL, doubling any embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Generate DDL statement for creating a table
pub fn generate_ddl(table_name: &str, schema: &Schema) -> String {
    let mut ddl = format!("CREATE TABLE {} (\n", quote_ident(table_name));

    let column_defs: Vec<String> = schema
        .columns
        .iter()
        .map(|col| format!("  {} {}", quote_ident(&col.name), col.sql_type.to_postgres()))
        .collect();

    ddl.push_str(&column_defs.join(",\n"));
    ddl.push_str("\n);");

    ddl
}

pub fn generate_drop(table_name: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(table_name))
}

/// Schema inferrer for delimited data, typing columns the way a dataframe CSV reader does
pub struct SchemaInferrer;

impl SchemaInferrer {
    /// Infer the type of a single non-null value
    fn infer_value_type(value: &str) -> SqlType {
        let trimmed = value.trim();

        if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false") {
            return SqlType::Boolean;
        }

        if trimmed.parse::<i64>().is_ok() {
            return SqlType::BigInt;
        }

        if trimmed.parse::<f64>().is_ok() {
            return SqlType::DoublePrecision;
        }

        SqlType::Text
    }

    /// Infer a column type from its values; all-null columns are TEXT
    fn infer_column_type<'a>(values: impl Iterator<Item = Option<&'a str>>) -> SqlType {
        values
            .flatten()
            .map(Self::infer_value_type)
            .reduce(SqlType::common_type)
            .unwrap_or(SqlType::Text)
    }

    /// Infer schema from a header and data rows
    pub fn infer_from_data(header: &[String], rows: &[FieldValues]) -> Schema {
        let columns = header
            .iter()
            .enumerate()
            .map(|(col_idx, name)| {
                let values = rows
                    .iter()
                    .map(|row| row.get(col_idx).and_then(|v| v.as_deref()));

                Column {
                    name: name.clone(),
                    sql_type: Self::infer_column_type(values),
                }
            })
            .collect();

        Schema { columns }
    }
}
