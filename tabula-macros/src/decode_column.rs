use proc_macro2::Ident;
use quote::ToTokens;
use syn::{Field, LitBool, LitStr, Token, Type, ext::IdentExt, parse::ParseBuffer};

pub(crate) struct ColumnMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    /// Field name as written, without the `r#` prefix.
    pub(crate) field: String,
    /// Column override.
    pub(crate) name: Option<String>,
    pub(crate) key: bool,
    pub(crate) generated: Option<bool>,
    pub(crate) skip: bool,
}

impl ColumnMetadata {
    pub(crate) fn column(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.field)
    }
}

pub fn decode_column(field: &Field) -> ColumnMetadata {
    let ident = field
        .ident
        .clone()
        .expect("Field is expected to have a name");
    let mut metadata = ColumnMetadata {
        field: ident.unraw().to_string(),
        ident,
        ty: field.ty.clone(),
        name: None,
        key: false,
        generated: None,
        skip: false,
    };
    for attr in &field.attrs {
        let meta = &attr.meta;
        if meta.path().is_ident("tabula") {
            let Ok(list) = meta.require_list() else {
                panic!(
                    "Error while parsing `tabula`, use it like: `#[tabula(attribute = value, ...)]`",
                );
            };
            let _ = list.parse_nested_meta(|arg| {
                if arg.path.is_ident("name") {
                    let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!("Error while parsing `name`, use it like: `#[tabula(name = \"MyColumn\")]`");
                    };
                    metadata.name = Some(v.value());
                } else if arg.path.is_ident("key") {
                    let Err(..) = arg.value() else {
                        // value() is Err for Meta::Path
                        panic!("Error while parsing `key`, use it like: `#[tabula(key)]`");
                    };
                    metadata.key = true;
                } else if arg.path.is_ident("generated") {
                    metadata.generated = Some(if arg.input.peek(Token![=]) {
                        let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitBool>) else {
                            panic!("Error while parsing `generated`, use it like: `#[tabula(generated)]` or `#[tabula(generated = false)]`");
                        };
                        v.value()
                    } else {
                        true
                    });
                } else if arg.path.is_ident("skip") {
                    let Err(..) = arg.value() else {
                        panic!("Error while parsing `skip`, use it like: `#[tabula(skip)]`");
                    };
                    metadata.skip = true;
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
    metadata
}
