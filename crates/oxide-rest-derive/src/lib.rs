//! Derive macro declaring schema relations from Rust structs.
//!
//! This crate provides the `#[derive(Relation)]` macro, which implements
//! `oxide_rest_core::schema::RelationDef` so a struct can be added to a
//! `Schema` with `Schema::new().with::<Message>()`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Expr, Fields, GenericArgument, Ident, Lit, Meta,
    PathArguments, Type, parse_macro_input,
};

/// Derives `RelationDef` for a struct with named fields.
///
/// # Attributes
///
/// - `#[relation(name = "messages")]` - The relation name (optional,
///   defaults to snake_case of the struct name)
/// - `#[relation(view)]` - Declares a view instead of a table
///
/// # Field Attributes
///
/// - `#[column(name = "column_name")]` - The column name (optional,
///   defaults to the field name)
/// - `#[column(pg_type = "timestamptz")]` - The PostgreSQL type (optional
///   for common Rust types)
/// - `#[column(nullable)]` - Marks the column as nullable; `Option<T>`
///   fields are nullable without it
/// - `#[references(relation = "users")]` - Declares a foreign key on this
///   column, with optional `column = "id"`, `fkey = "name"` and
///   `one_to_one`
///
/// # Generated Items
///
/// - `impl RelationDef for Struct`
/// - `Struct::RELATION_NAME` and `Struct::COLUMNS` constants
#[proc_macro_derive(Relation, attributes(relation, column, references))]
pub fn derive_relation(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_relation_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_relation_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let relation_attrs = parse_relation_attrs(&input.attrs, struct_name)?;
    let relation_name = &relation_attrs.name;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Relation derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Relation derive only supports structs",
            ));
        }
    };

    let mut columns: Vec<ColumnInfo> = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let attrs = parse_column_attrs(&field.attrs)?;
        let (inferred_type, is_option) = pg_type_of(&field.ty);
        let data_type = match attrs.pg_type.or(inferred_type) {
            Some(data_type) => data_type,
            None => {
                return Err(syn::Error::new_spanned(
                    &field.ty,
                    "cannot infer the PostgreSQL type; add #[column(pg_type = \"...\")]",
                ));
            }
        };
        let column_name = attrs.name.unwrap_or_else(|| field_name.to_string());
        let references = parse_references(&field.attrs, relation_name, &column_name)?;

        columns.push(ColumnInfo {
            column_name,
            data_type,
            nullable: attrs.nullable || is_option,
            references,
        });
    }

    let kind = if relation_attrs.view {
        quote! { ::oxide_rest_core::schema::RelationKind::View }
    } else {
        quote! { ::oxide_rest_core::schema::RelationKind::Table }
    };

    let column_entries: Vec<TokenStream2> = columns
        .iter()
        .map(|c| {
            let name = &c.column_name;
            let data_type = &c.data_type;
            let nullable = c.nullable;
            quote! {
                ::oxide_rest_core::schema::Column {
                    name: ::std::string::String::from(#name),
                    data_type: ::std::string::String::from(#data_type),
                    nullable: #nullable,
                }
            }
        })
        .collect();

    let relationship_entries: Vec<TokenStream2> = columns
        .iter()
        .filter_map(|c| c.references.as_ref().map(|r| (c, r)))
        .map(|(c, r)| {
            let column = &c.column_name;
            let fkey = &r.fkey;
            let referenced_relation = &r.relation;
            let referenced_column = &r.column;
            let one_to_one = r.one_to_one;
            quote! {
                ::oxide_rest_core::schema::Relationship {
                    foreign_key_name: ::std::string::String::from(#fkey),
                    columns: ::std::vec![::std::string::String::from(#column)],
                    referenced_relation: ::std::string::String::from(#referenced_relation),
                    referenced_columns: ::std::vec![::std::string::String::from(#referenced_column)],
                    is_one_to_one: #one_to_one,
                }
            }
        })
        .collect();

    let column_names: Vec<&str> = columns.iter().map(|c| c.column_name.as_str()).collect();

    let expanded = quote! {
        impl ::oxide_rest_core::schema::RelationDef for #struct_name {
            fn relation() -> ::oxide_rest_core::schema::Relation {
                ::oxide_rest_core::schema::Relation {
                    name: ::std::string::String::from(#relation_name),
                    kind: #kind,
                    columns: ::std::vec![#(#column_entries),*],
                    relationships: ::std::vec![#(#relationship_entries),*],
                }
            }
        }

        impl #struct_name {
            /// The relation name.
            pub const RELATION_NAME: &'static str = #relation_name;

            /// Column names in declaration order.
            pub const COLUMNS: &'static [&'static str] = &[#(#column_names),*];
        }
    };

    Ok(expanded)
}

struct ColumnInfo {
    column_name: String,
    data_type: String,
    nullable: bool,
    references: Option<ReferenceInfo>,
}

struct RelationAttrs {
    name: String,
    view: bool,
}

struct ColumnAttrs {
    name: Option<String>,
    pg_type: Option<String>,
    nullable: bool,
}

struct ReferenceInfo {
    relation: String,
    column: String,
    fkey: String,
    one_to_one: bool,
}

fn string_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    match value {
        Expr::Lit(lit) => match lit.lit {
            Lit::Str(s) => Ok(s.value()),
            other => Err(syn::Error::new_spanned(other, "expected a string literal")),
        },
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

fn parse_relation_attrs(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<RelationAttrs> {
    let mut result = RelationAttrs {
        name: to_snake_case(&struct_name.to_string()),
        view: false,
    };
    for attr in attrs {
        if !attr.path().is_ident("relation") || matches!(attr.meta, Meta::Path(_)) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                result.name = string_value(&meta)?;
            } else if meta.path.is_ident("view") {
                result.view = true;
            } else {
                return Err(meta.error("unknown relation attribute"));
            }
            Ok(())
        })?;
    }
    Ok(result)
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut result = ColumnAttrs {
        name: None,
        pg_type: None,
        nullable: false,
    };

    for attr in attrs {
        if !attr.path().is_ident("column") || matches!(attr.meta, Meta::Path(_)) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                result.name = Some(string_value(&meta)?);
            } else if meta.path.is_ident("pg_type") {
                result.pg_type = Some(string_value(&meta)?);
            } else if meta.path.is_ident("nullable") {
                result.nullable = true;
            } else {
                return Err(meta.error("unknown column attribute"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

fn parse_references(
    attrs: &[Attribute],
    relation_name: &str,
    column_name: &str,
) -> syn::Result<Option<ReferenceInfo>> {
    let Some(attr) = attrs.iter().find(|a| a.path().is_ident("references")) else {
        return Ok(None);
    };

    let mut relation = None;
    let mut column = None;
    let mut fkey = None;
    let mut one_to_one = false;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("relation") {
            relation = Some(string_value(&meta)?);
        } else if meta.path.is_ident("column") {
            column = Some(string_value(&meta)?);
        } else if meta.path.is_ident("fkey") {
            fkey = Some(string_value(&meta)?);
        } else if meta.path.is_ident("one_to_one") {
            one_to_one = true;
        } else {
            return Err(meta.error("unknown references attribute"));
        }
        Ok(())
    })?;

    let Some(relation) = relation else {
        return Err(syn::Error::new_spanned(
            attr,
            "#[references] requires relation = \"...\"",
        ));
    };

    Ok(Some(ReferenceInfo {
        relation,
        column: column.unwrap_or_else(|| String::from("id")),
        // PostgreSQL's default constraint name.
        fkey: fkey.unwrap_or_else(|| format!("{relation_name}_{column_name}_fkey")),
        one_to_one,
    }))
}

/// Returns the PostgreSQL type for a Rust type, and whether it is an
/// `Option`.
fn pg_type_of(ty: &Type) -> (Option<String>, bool) {
    if let Some(inner) = generic_argument(ty, "Option") {
        return (pg_type_of(inner).0, true);
    }
    if let Some(inner) = generic_argument(ty, "Vec") {
        if last_ident(inner).as_deref() == Some("u8") {
            return (Some(String::from("bytea")), false);
        }
        return (pg_type_of(inner).0.map(|t| format!("_{t}")), false);
    }
    if let Type::Reference(reference) = ty {
        return pg_type_of(&reference.elem);
    }

    let pg_type = match last_ident(ty).as_deref() {
        Some("bool") => "bool",
        Some("i16") => "int2",
        Some("i32") => "int4",
        Some("i64" | "u32") => "int8",
        Some("f32") => "float4",
        Some("f64") => "float8",
        Some("Decimal") => "numeric",
        Some("String" | "str") => "text",
        Some("Uuid") => "uuid",
        Some("Value") => "jsonb",
        Some("NaiveDate") => "date",
        Some("NaiveTime") => "time",
        Some("NaiveDateTime") => "timestamp",
        Some("DateTime") => "timestamptz",
        _ => return (None, false),
    };
    (Some(String::from(pg_type)), false)
}

fn last_ident(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    }
}

fn generic_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    })
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
