use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, Meta, Type};

/// Derive macro that generates CSV column information from struct fields.
///
/// For each field, extracts:
/// - Column name (respects #[serde(rename = "...")])
/// - Required (false for Option<T> or #[serde(default)] fields)
/// - Description (from doc comments)
///
/// Generates a `csv_schema() -> &'static [CsvField]` method. `CsvField` must
/// be in scope where the struct is defined.
#[proc_macro_derive(CsvSchema, attributes(serde))]
pub fn derive_csv_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => panic!("CsvSchema only supports structs with named fields"),
        },
        _ => panic!("CsvSchema only supports structs"),
    };

    let columns: Vec<_> = fields
        .iter()
        .map(|field| {
            let field_name = field.ident.as_ref().unwrap().to_string();
            let column_name = serde_rename(&field.attrs).unwrap_or(field_name);
            let required = !is_option_type(&field.ty) && !has_serde_default(&field.attrs);
            let description = doc_comment(&field.attrs);
            (column_name, required, description)
        })
        .collect();

    let entries = columns.iter().map(|(name, required, description)| {
        quote! {
            CsvField {
                name: #name,
                required: #required,
                description: #description,
            }
        }
    });

    let expanded = quote! {
        impl #name {
            pub fn csv_schema() -> &'static [CsvField] {
                static SCHEMA: &[CsvField] = &[
                    #(#entries),*
                ];
                SCHEMA
            }
        }
    };

    TokenStream::from(expanded)
}

fn serde_meta_items(attrs: &[syn::Attribute]) -> Vec<String> {
    let mut items = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        if let Meta::List(meta_list) = &attr.meta {
            let tokens = meta_list.tokens.to_string();
            items.extend(tokens.split(',').map(|item| item.trim().to_string()));
        }
    }
    items
}

fn serde_rename(attrs: &[syn::Attribute]) -> Option<String> {
    for item in serde_meta_items(attrs) {
        let Some(value) = item.strip_prefix("rename") else {
            continue;
        };
        let value = value.trim_start().strip_prefix('=')?.trim_start();
        let value = value.strip_prefix('"')?;
        if let Some(end) = value.find('"') {
            return Some(value[..end].to_string());
        }
    }
    None
}

fn has_serde_default(attrs: &[syn::Attribute]) -> bool {
    serde_meta_items(attrs)
        .iter()
        .any(|item| item == "default" || item.starts_with("default ") || item.starts_with("default="))
}

fn doc_comment(attrs: &[syn::Attribute]) -> String {
    attrs
        .iter()
        .filter_map(|attr| {
            if !attr.path().is_ident("doc") {
                return None;
            }
            if let Meta::NameValue(meta) = &attr.meta {
                if let syn::Expr::Lit(expr_lit) = &meta.value {
                    if let Lit::Str(lit_str) = &expr_lit.lit {
                        return Some(lit_str.value().trim().to_string());
                    }
                }
            }
            None
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}
