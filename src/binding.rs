//! Source-language conventions the scanner is parameterized by.
//!
//! The synthesis engine itself knows nothing about the language the program
//! was written in. Field visibility, the primitive type table, how an import
//! is named when it has no alias and the names of the origin extensions all
//! come from a [`SourceBinding`].

use crate::program::{Field, TypeExpr, Visibility};

/// Language-specific rules used while synthesizing schemas.
pub trait SourceBinding {
    /// Whether the field appears in the serialized form of its struct.
    fn is_exported(&self, field: &Field) -> bool;

    /// The `(type, format)` pair for a primitive type name, if it is one.
    fn primitive(&self, name: &str) -> Option<(&'static str, &'static str)>;

    /// Whether a map key type serializes as a string.
    fn is_string_key(&self, key: &TypeExpr) -> bool;

    /// Name an import is known by when it carries no explicit alias.
    fn import_name<'a>(&self, path: &'a str) -> &'a str;

    /// Extension key recording a renamed declaration's or field's identifier.
    fn name_extension(&self) -> &'static str;

    /// Extension key recording the package a declaration lives in.
    fn package_extension(&self) -> &'static str;
}

/// Conventions of Rust sources lowered by [`crate::loader`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBinding {
    /// Only `pub` fields are visible; otherwise every non-skipped field is
    pub public_fields_only: bool,
}

impl RustBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn public_fields_only() -> Self {
        Self {
            public_fields_only: true,
        }
    }
}

impl SourceBinding for RustBinding {
    fn is_exported(&self, field: &Field) -> bool {
        if field.skipped {
            return false;
        }
        !self.public_fields_only || field.visibility == Visibility::Public
    }

    fn primitive(&self, name: &str) -> Option<(&'static str, &'static str)> {
        let mapped = match name {
            "bool" => ("boolean", ""),
            "String" | "str" | "char" | "PathBuf" | "Path" | "OsString" => ("string", ""),
            "i8" => ("integer", "int8"),
            "i16" => ("integer", "int16"),
            "i32" => ("integer", "int32"),
            "i64" | "isize" => ("integer", "int64"),
            "u8" => ("integer", "uint8"),
            "u16" => ("integer", "uint16"),
            "u32" => ("integer", "uint32"),
            "u64" | "usize" => ("integer", "uint64"),
            "i128" | "u128" => ("integer", ""),
            "f32" => ("number", "float"),
            "f64" => ("number", "double"),
            // Well-known types from the wider ecosystem, matched by last path segment
            "Uuid" => ("string", "uuid"),
            "DateTime" | "NaiveDateTime" | "OffsetDateTime" | "SystemTime" => {
                ("string", "date-time")
            }
            "NaiveDate" | "Date" => ("string", "date"),
            "Url" => ("string", "uri"),
            "IpAddr" => ("string", "ip"),
            "Ipv4Addr" => ("string", "ipv4"),
            "Ipv6Addr" => ("string", "ipv6"),
            "Value" | "Map" => ("object", ""),
            _ => return None,
        };
        Some(mapped)
    }

    fn is_string_key(&self, key: &TypeExpr) -> bool {
        matches!(key.deref(), TypeExpr::Ident(name) if name == "String" || name == "str")
    }

    fn import_name<'a>(&self, path: &'a str) -> &'a str {
        path.rsplit("::").next().unwrap_or(path)
    }

    fn name_extension(&self) -> &'static str {
        "x-rust-name"
    }

    fn package_extension(&self) -> &'static str {
        "x-rust-package"
    }
}
