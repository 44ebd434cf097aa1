mod decode_column;
mod decode_table;
mod from_row_trait;
mod string_enum;

use decode_table::decode_table;
use from_row_trait::from_row_trait;
use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemEnum, ItemStruct, parse_macro_input};

/// Maps a struct with named fields onto a table.
///
/// Type attributes: `#[tabula(name = "Table")]`, `#[tabula(keyless)]`.
/// Field attributes: `#[tabula(name = "Column")]`, `#[tabula(key)]`,
/// `#[tabula(generated)]` / `#[tabula(generated = false)]`, `#[tabula(skip)]`.
///
/// Mapped fields must implement `AsValue` and `Clone`, skipped fields `Default`.
#[proc_macro_derive(Entity, attributes(tabula))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let table = decode_table(parse_macro_input!(input as ItemStruct));
    let name = &table.item.ident;
    let entity = &table.entity;
    let table_name = match &table.name {
        Some(v) => quote!(Some(#v)),
        None => quote!(None),
    };
    let keyless = table.keyless;
    let fields_count = table.columns.len();
    let field_defs = table.columns.iter().map(|c| {
        let field = &c.field;
        let mut def = quote!(::tabula::FieldDef::new(#field));
        if let Some(column) = &c.name {
            def = quote!(#def.column(#column));
        }
        if c.key {
            def = quote!(#def.key());
        }
        if let Some(generated) = c.generated {
            def = quote!(#def.generated(#generated));
        }
        if c.skip {
            def = quote!(#def.skip());
        }
        def
    });
    let field_value = table.mapped().map(|c| {
        let field = &c.field;
        let ident = &c.ident;
        quote!(#field => Some(::tabula::AsValue::as_value(::std::clone::Clone::clone(&self.#ident))),)
    });
    let set_field_value = table.mapped().map(|c| {
        let field = &c.field;
        let ident = &c.ident;
        let ty = &c.ty;
        quote! {
            #field => {
                self.#ident = <#ty as ::tabula::AsValue>::try_from_value(value)?;
                Ok(())
            }
        }
    });
    let (from_row, from_row_factory) = from_row_trait(&table);
    quote! {
        const _: () = {
            #from_row_factory
            impl ::tabula::Entity for #name {
                fn descriptor() -> &'static ::tabula::EntityDescriptor {
                    static DESCRIPTOR: ::std::sync::LazyLock<::tabula::EntityDescriptor> =
                        ::std::sync::LazyLock::new(|| {
                            let fields: [::tabula::FieldDef; #fields_count] = [#(#field_defs),*];
                            ::tabula::EntityDescriptor::new(#entity, #table_name, #keyless, fields)
                        });
                    &DESCRIPTOR
                }

                fn field_value(&self, field: &str) -> ::std::option::Option<::tabula::Value> {
                    match field {
                        #(#field_value)*
                        _ => None,
                    }
                }

                fn set_field_value(&mut self, field: &str, value: ::tabula::Value) -> ::tabula::Result<()> {
                    match field {
                        #(#set_field_value)*
                        _ => Err(::tabula::Error::msg(format!(
                            "Entity `{}` has no mapped field `{}`",
                            #entity,
                            field
                        ))),
                    }
                }

                fn from_row(row: ::tabula::RowLabeled) -> ::tabula::Result<Self> {
                    #from_row
                }
            }
        };
    }
    .into()
}

/// Stores a fieldless enum by variant name.
///
/// `#[tabula(name = "...")]` renames a variant, `#[tabula(ignore_case)]` on the
/// enum makes decoding case insensitive.
#[proc_macro_derive(StringEnum, attributes(tabula))]
pub fn derive_string_enum(input: TokenStream) -> TokenStream {
    string_enum::string_enum(parse_macro_input!(input as ItemEnum)).into()
}
