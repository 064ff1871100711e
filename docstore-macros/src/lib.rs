//! Procedural macros for the docstore project.
//!
//! `#[derive(DocumentFields)]` generates a `FieldRegistry` implementation mapping each
//! field's serialized name to an accessor, so filters can be built from stored names without
//! runtime reflection. The serialized name follows serde: a field-level
//! `#[serde(rename = "..")]` wins, then a container-level `#[serde(rename_all = "..")]`, then
//! the Rust field name. Fields marked `#[serde(skip)]` or `#[serde(skip_serializing)]` are not
//! registered.
//!
//! Generated code refers to the `docstore` crate. Crates depending on the sub-crates directly
//! can point it elsewhere with `#[docstore(crate = "docstore_core")]`.

#[allow(unused_extern_crates)]
extern crate self as docstore_macros;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Fields, LitStr, Token, meta::ParseNestedMeta, parse_macro_input,
    spanned::Spanned,
};

#[proc_macro_derive(DocumentFields, attributes(docstore))]
pub fn derive_document_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new(
                    input.ident.span(),
                    "DocumentFields requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                "DocumentFields can only be derived for structs",
            ))
        }
    };

    let krate = crate_path(&input.attrs)?;
    let container = SerdeAttrs::parse(&input.attrs)?;
    let rename_all = container
        .rename_all
        .as_ref()
        .map(RenameRule::parse)
        .transpose()?;

    let mut names = Vec::new();
    let mut idents = Vec::new();
    for field in fields {
        let attrs = SerdeAttrs::parse(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new(field.span(), "expected a named field"))?;
        let rust_name = ident.to_string();
        let rust_name = rust_name.strip_prefix("r#").unwrap_or(&rust_name);

        let name = match (&attrs.rename, &rename_all) {
            (Some(rename), _) => rename.value(),
            (None, Some(rule)) => rule.apply(rust_name),
            (None, None) => rust_name.to_string(),
        };

        names.push(name);
        idents.push(ident.clone());
    }

    let ident = &input.ident;
    let type_name = ident.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #krate::document::FieldRegistry for #ident #ty_generics #where_clause {
            fn field_names() -> &'static [&'static str] {
                &[#(#names),*]
            }

            fn field_value(
                &self,
                name: &str,
            ) -> #krate::error::DocumentStoreResult<#krate::bson::Bson> {
                match name {
                    #(#names => #krate::document::field_to_bson(&self.#idents),)*
                    _ => ::core::result::Result::Err(
                        #krate::error::DocumentStoreError::unknown_field(name, #type_name),
                    ),
                }
            }
        }
    })
}

/// Reads `#[docstore(crate = "..")]`, defaulting to `::docstore`.
fn crate_path(attrs: &[Attribute]) -> syn::Result<syn::Path> {
    let mut path = None;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("docstore")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                let lit: LitStr = meta.value()?.parse()?;
                path = Some(lit.parse::<syn::Path>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported docstore attribute"))
            }
        })?;
    }

    Ok(path.unwrap_or_else(|| syn::parse_quote!(::docstore)))
}

/// The subset of serde attributes that decides a field's serialized name.
#[derive(Default)]
struct SerdeAttrs {
    rename: Option<LitStr>,
    rename_all: Option<LitStr>,
    skip: bool,
}

impl SerdeAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    parsed.rename = serialize_name(&meta)?;
                } else if meta.path.is_ident("rename_all") {
                    parsed.rename_all = serialize_name(&meta)?;
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    parsed.skip = true;
                } else {
                    ignore(&meta)?;
                }
                Ok(())
            })?;
        }

        Ok(parsed)
    }
}

/// Reads `name = "x"` or the `serialize` half of `name(serialize = "x", deserialize = "y")`.
fn serialize_name(meta: &ParseNestedMeta) -> syn::Result<Option<LitStr>> {
    if meta.input.peek(Token![=]) {
        return Ok(Some(meta.value()?.parse()?));
    }

    let mut name = None;
    meta.parse_nested_meta(|nested| {
        if nested.path.is_ident("serialize") {
            name = Some(nested.value()?.parse()?);
        } else {
            ignore(&nested)?;
        }
        Ok(())
    })?;

    Ok(name)
}

/// Consumes the value of an attribute we do not interpret.
fn ignore(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        content.parse::<TokenStream2>()?;
    }
    Ok(())
}

/// Serde's `rename_all` conventions, applied to snake_case Rust field names.
enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn parse(lit: &LitStr) -> syn::Result<Self> {
        Ok(match lit.value().as_str() {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "PascalCase" => Self::Pascal,
            "camelCase" => Self::Camel,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
            other => {
                return Err(syn::Error::new(
                    lit.span(),
                    format!("unsupported rename_all rule `{other}`"),
                ))
            }
        })
    }

    fn apply(&self, field: &str) -> String {
        match self {
            Self::Lower | Self::Snake => field.to_string(),
            Self::Upper | Self::ScreamingSnake => field.to_ascii_uppercase(),
            Self::Kebab => field.replace('_', "-"),
            Self::ScreamingKebab => field.replace('_', "-").to_ascii_uppercase(),
            Self::Pascal => pascal_case(field),
            Self::Camel => {
                let pascal = pascal_case(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            }
        }
    }
}

fn pascal_case(field: &str) -> String {
    field
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
