use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{Fields, ItemEnum, LitStr, ext::IdentExt, parse::ParseBuffer};

/// Stored name of a variant: `#[tabula(name = "...")]` or the variant identifier.
fn variant_name(variant: &syn::Variant) -> String {
    let mut name = variant.ident.unraw().to_string();
    for attr in &variant.attrs {
        if attr.meta.path().is_ident("tabula") {
            let Ok(list) = attr.meta.require_list() else {
                panic!("Error while parsing `tabula`, use it like: `#[tabula(name = \"Value\")]`");
            };
            let _ = list.parse_nested_meta(|arg| {
                if arg.path.is_ident("name") {
                    let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!("Error while parsing `name`, use it like: `#[tabula(name = \"Value\")]`");
                    };
                    name = v.value();
                } else {
                    panic!(
                        "Unknown attribute `{}` inside tabula macro",
                        arg.path.to_token_stream().to_string()
                    );
                }
                Ok(())
            });
        }
    }
    name
}

fn ignore_case(item: &ItemEnum) -> bool {
    let mut result = false;
    for attr in &item.attrs {
        if attr.meta.path().is_ident("tabula") {
            let Ok(list) = attr.meta.require_list() else {
                panic!("Error while parsing `tabula`, use it like: `#[tabula(ignore_case)]`");
            };
            let _ = list.parse_nested_meta(|arg| {
                if arg.path.is_ident("ignore_case") {
                    let Err(..) = arg.value() else {
                        panic!("Error while parsing `ignore_case`, use it like: `#[tabula(ignore_case)]`");
                    };
                    result = true;
                } else {
                    panic!(
                        "Unknown attribute `{}` inside tabula macro",
                        arg.path.to_token_stream().to_string()
                    );
                }
                Ok(())
            });
        }
    }
    result
}

pub(crate) fn string_enum(item: ItemEnum) -> TokenStream {
    let name = &item.ident;
    if !item.generics.params.is_empty() {
        panic!("StringEnum `{}` cannot have generic parameters", name);
    }
    if item.variants.is_empty() {
        panic!("StringEnum `{}` must have at least one variant", name);
    }
    if let Some(v) = item.variants.iter().find(|v| !matches!(v.fields, Fields::Unit)) {
        panic!(
            "Variant `{}::{}` carries data, StringEnum supports only unit variants",
            name, v.ident
        );
    }
    let variants: Vec<_> = item.variants.iter().map(|v| &v.ident).collect();
    let names: Vec<_> = item.variants.iter().map(variant_name).collect();
    for (i, n) in names.iter().enumerate() {
        if names[..i].contains(n) {
            panic!("StringEnum `{}` uses the name `{}` more than once", name, n);
        }
    }
    let ordinals = 0..variants.len();
    let ignore_case = ignore_case(&item);
    quote! {
        impl ::tabula::StringEnum for #name {
            const NAMES: &'static [&'static str] = &[#(#names),*];
            fn name(&self) -> &'static str {
                match self {
                    #(Self::#variants => #names,)*
                }
            }
            fn from_ordinal(ordinal: usize) -> ::std::option::Option<Self> {
                match ordinal {
                    #(#ordinals => ::std::option::Option::Some(Self::#variants),)*
                    _ => ::std::option::Option::None,
                }
            }
        }
        impl ::tabula::AsValue for #name {
            fn as_empty_value() -> ::tabula::Value {
                ::tabula::Value::Varchar(None)
            }
            fn as_value(self) -> ::tabula::Value {
                ::tabula::string_enum_as_value(&self)
            }
            fn try_from_value(value: ::tabula::Value) -> ::tabula::Result<Self> {
                ::tabula::handler_try_from_value(
                    &::tabula::StringEnumHandler::<Self>::new(#ignore_case),
                    value,
                )
            }
            fn try_from_nullable(value: ::tabula::Value) -> ::tabula::Result<::std::option::Option<Self>> {
                ::tabula::handler_try_from_nullable(
                    &::tabula::StringEnumHandler::<Self>::new(#ignore_case),
                    value,
                )
            }
        }
    }
}
