use crate::decode_table::TableMetadata;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// Emits a factory building the entity from a labeled row.
///
/// When the entity implements `Default` the inherent `from_row` wins: it starts
/// from the default value and overwrites the columns found in the row, so a
/// partial projection still decodes. Otherwise the trait fallback requires
/// every mapped column to be present. A row label matches a field by column
/// name, or by field name when no other field is stored under that name.
pub(crate) fn from_row_trait(table: &TableMetadata) -> (TokenStream, TokenStream) {
    let item = &table.item;
    let struct_name = &item.ident;
    let trait_name = format_ident!("{}FromRowTrait", item.ident);
    let factory_name = format_ident!("{}FromRowFactory", item.ident);
    let mapped: Vec<_> = table.mapped().collect();
    let holders: Vec<_> = (0..mapped.len()).map(|i| format_ident!("__field_{}", i)).collect();
    // A label matches the column, or the field name when no column is called like it
    let labels: Vec<Vec<&str>> = mapped
        .iter()
        .map(|c| {
            let mut labels = vec![c.column()];
            if c.field != c.column() && !mapped.iter().any(|o| o.column() == c.field) {
                labels.push(&c.field);
            }
            labels
        })
        .collect();
    let holders_declarations = mapped.iter().zip(&holders).map(|(c, holder)| {
        let ty = &c.ty;
        quote!(let mut #holder: Option<#ty> = None;)
    });
    let assign_default = mapped.iter().zip(&labels).map(|(c, labels)| {
        let ident = &c.ident;
        let ty = &c.ty;
        quote!(#(#labels)|* => result.#ident = <#ty as ::tabula::AsValue>::try_from_value(__v__)?,)
    });
    let assign_holder = mapped.iter().zip(&holders).zip(&labels).map(|((c, holder), labels)| {
        let ty = &c.ty;
        quote!(#(#labels)|* => #holder = Some(<#ty as ::tabula::AsValue>::try_from_value(__v__)?),)
    });
    let create_mapped = mapped.iter().zip(&holders).map(|(c, holder)| {
        let column = c.column();
        let ident = &c.ident;
        quote!(#ident: #holder.ok_or_else(|| __make_error__(#column))?)
    });
    let create_skipped = table.columns.iter().filter(|c| c.skip).map(|c| {
        let ident = &c.ident;
        quote!(#ident: ::std::default::Default::default())
    });
    (
        quote!(#factory_name::<#struct_name>::from_row(row)),
        quote! {
            trait #trait_name {
                fn from_row(row: ::tabula::RowLabeled) -> ::tabula::Result<#struct_name>;
            }
            struct #factory_name<T>(::std::marker::PhantomData<T>);
            #[allow(dead_code)]
            impl<T: ::std::default::Default + ::std::convert::Into<#struct_name>> #factory_name<T> {
                fn from_row(row: ::tabula::RowLabeled) -> ::tabula::Result<#struct_name> {
                    let mut result: #struct_name = T::default().into();
                    for (__n__, __v__) in ::std::iter::zip(row.labels.iter(), ::std::iter::IntoIterator::into_iter(row.values)) {
                        match __n__.as_str() {
                            #(#assign_default)*
                            _ => {}
                        }
                    }
                    Ok(result)
                }
            }
            #[allow(dead_code)]
            impl<T> #trait_name for #factory_name<T> {
                fn from_row(row: ::tabula::RowLabeled) -> ::tabula::Result<#struct_name> {
                    #(#holders_declarations)*
                    for (__n__, __v__) in ::std::iter::zip(row.labels.iter(), ::std::iter::IntoIterator::into_iter(row.values)) {
                        match __n__.as_str() {
                            #(#assign_holder)*
                            _ => {}
                        }
                    }
                    let __make_error__ = |name: &str| ::tabula::Error::msg(format!(
                        "Column `{}` does not exist in the row provided",
                        name
                    ));
                    Ok(#struct_name {
                        #(#create_mapped,)*
                        #(#create_skipped,)*
                    })
                }
            }
        },
    )
}
